//! Helper functions for MCP tool handlers.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::vault::{Heading, TargetType, VaultError};

/// Map a client error onto an MCP error.
///
/// Rejected arguments become `invalid_params`, everything else is an
/// internal error carrying the full rendered message.
pub fn to_mcp_error(err: VaultError) -> McpError {
    match err {
        VaultError::InvalidArgument(message) => McpError::invalid_params(message, None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

/// Wrap plain text as a successful tool result.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Pretty-print a value as a successful tool result.
pub fn json_result<T: Serialize + ?Sized>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(text_result(json_str))
}

/// Heading paths that contain the target, or are contained in it.
pub fn similar_heading_paths(headings: &[Heading], target: &str) -> Vec<String> {
    headings
        .iter()
        .filter(|h| h.path.contains(target) || target.contains(h.path.as_str()))
        .map(|h| h.path.clone())
        .collect()
}

/// Message returned instead of patching when a heading target has no exact match.
pub fn similar_headings_message(target: &str, similar: &[String], trim_whitespace: bool) -> String {
    let mut message = format!(
        "No exact match for heading '{}'. Similar headings: {}",
        target,
        similar.join(", ")
    );
    if trim_whitespace {
        message.push_str(". Target already has trim_whitespace=true.");
    } else {
        message.push_str(". Consider using trim_whitespace=true or check exact heading path.");
    }
    message
}

/// Pick the heading path to patch.
///
/// An exact path match wins. Otherwise, with `trim_whitespace`, the first
/// path containing the heading is used. Failing both, the heading is used
/// as given.
pub fn resolve_heading_target(
    headings: &[Heading],
    heading: &str,
    trim_whitespace: bool,
) -> String {
    if let Some(exact) = headings.iter().find(|h| h.path == heading) {
        return exact.path.clone();
    }

    let similar = headings.iter().find(|h| {
        h.path.contains(heading) || (trim_whitespace && h.path.trim().contains(heading.trim()))
    });

    match similar {
        Some(h) if trim_whitespace => h.path.clone(),
        _ => heading.to_string(),
    }
}

/// Human-readable listing of a note's headings.
pub fn heading_listing(filepath: &str, headings: &[Heading]) -> String {
    if headings.is_empty() {
        return format!("No headings found in {}.", filepath);
    }

    let lines = headings
        .iter()
        .map(|h| format!("Level {}: {} (path: {})", h.level, h.text, h.path))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Headings in {}:\n\n{}\n\nUse one of these paths with the 'heading' parameter to target a specific section.",
        filepath, lines
    )
}

/// Enrich a failed patch with a tool-level suggestion.
pub fn patch_error(err: VaultError, target_type: TargetType) -> McpError {
    if matches!(err, VaultError::InvalidArgument(_)) {
        return to_mcp_error(err);
    }

    let mut message = err.to_string();

    match err.status() {
        Some(404) if target_type == TargetType::Heading => message.push_str(
            "\n\nSuggestion: Check that the heading exists exactly as specified. You can use trim_whitespace=true to ignore whitespace differences, or create_if_missing=true to create the heading if it doesn't exist.",
        ),
        Some(400) => message.push_str(
            "\n\nSuggestion: Verify that your operation, target_type, and target values are valid. Heading paths should use :: as delimiters between levels.",
        ),
        _ => {}
    }

    McpError::internal_error(message, None)
}

/// Enrich a failed heading insert with the headings that do exist.
pub fn add_to_heading_error(err: VaultError, filepath: &str, headings: &[Heading]) -> McpError {
    if headings.is_empty() || !err.is_not_found() {
        return to_mcp_error(err);
    }

    let available = headings
        .iter()
        .map(|h| format!("- {}", h.path))
        .collect::<Vec<_>>()
        .join("\n");

    McpError::internal_error(
        format!(
            "{}\n\nAvailable headings in {}:\n{}\n\nTry using one of these heading paths or set create_if_missing=true to create a new heading.",
            err, filepath, available
        ),
        None,
    )
}
