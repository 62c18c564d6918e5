//! Error type for the Local REST API client.
//!
//! HTTP and network failures are caught once at the client boundary and
//! rendered with the operation name, the request context and a situational
//! suggestion, so the text can be handed to an agent as-is.

use std::fmt;

use thiserror::Error;

/// Errors produced by [`VaultClient`](super::VaultClient).
#[derive(Debug, Error)]
pub enum VaultError {
    /// The API answered with a non-2xx status.
    #[error("{0}")]
    Api(ApiFailure),

    /// The request never produced a usable response.
    #[error("{failure}")]
    Request {
        failure: RequestFailure,
        #[source]
        source: reqwest::Error,
    },

    /// An argument was rejected before any request was made.
    #[error("{0}")]
    InvalidArgument(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Setup(#[source] reqwest::Error),
}

impl VaultError {
    /// HTTP status of an API failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultError::Api(failure) => Some(failure.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        VaultError::InvalidArgument(message.into())
    }
}

/// Key/value pairs describing the request that failed.
pub type ErrorContext = Vec<(&'static str, String)>;

/// A non-2xx response, with the server-provided error code and message.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: u16,
    /// `errorCode` from the response body, `-1` when absent.
    pub code: i64,
    pub message: String,
    pub operation: &'static str,
    pub context: ErrorContext,
    pub suggestion: Option<String>,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: {}", self.code, self.message)?;
        write!(f, "\nOperation: {}", self.operation)?;

        let details = self
            .context
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}='{}'", key, value))
            .collect::<Vec<_>>()
            .join(", ");
        if !details.is_empty() {
            write!(f, "\nContext: {}", details)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

/// A transport-level failure (connection refused, timeout, undecodable body).
#[derive(Debug)]
pub struct RequestFailure {
    pub detail: String,
    pub operation: &'static str,
    pub suggestion: Option<String>,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request failed: {}", self.detail)?;
        write!(f, "\nOperation: {}", self.operation)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Suggestion attached to an API failure, keyed on status and operation.
pub(crate) fn api_suggestion(
    status: u16,
    operation: &str,
    context: &ErrorContext,
) -> Option<String> {
    match (status, operation) {
        (404, "get_file_contents") => {
            let filepath = context
                .iter()
                .find(|(key, _)| *key == "filepath")
                .map(|(_, value)| value.as_str())
                .unwrap_or_default();
            Some(format!(
                "Check if the file '{}' exists in your vault. Use list_files_in_vault() to see available files.",
                filepath
            ))
        }
        (404, "patch_content") => Some(
            "Verify that the target exists in the document. For headings, ensure exact match including whitespace and case."
                .to_string(),
        ),
        (400, "patch_content") => Some(
            "Check that your operation, target_type, and target values are valid. Ensure target is properly URL-encoded if it contains special characters."
                .to_string(),
        ),
        _ => None,
    }
}

/// Render a reqwest error with its whole source chain.
pub(crate) fn describe_request_error(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}
