use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::vault::{PatchOptions, TargetType, VaultClient, VaultConfig};

use super::helpers::{
    add_to_heading_error, heading_listing, json_result, patch_error, resolve_heading_target,
    similar_heading_paths, similar_headings_message, text_result, to_mcp_error,
};
use super::types::{
    AddTagParams, AddToHeadingParams, AppendContentParams, BatchGetFileContentsParams,
    ComplexSearchParams, CreateOrUpdateNoteParams, DeleteFileParams, FindHeadingsParams,
    GetFileContentsParams, ListFilesInDirParams, PatchContentParams, PeriodicNoteParams,
    RecentChangesParams, RecentPeriodicNotesParams, SearchResultItem, SetFrontmatterFieldParams,
    SimpleSearchParams,
};

#[derive(Clone)]
pub struct VaultMcpServer {
    config: Arc<VaultConfig>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VaultMcpServer {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Fresh client for a single tool invocation.
    fn client(&self) -> Result<VaultClient, McpError> {
        VaultClient::new(&self.config).map_err(to_mcp_error)
    }

    /// List files in the vault root
    #[tool(
        name = "obsidian_list_files_in_vault",
        description = "Lists all files and directories in the root directory of your Obsidian vault."
    )]
    pub async fn list_files_in_vault(&self) -> Result<CallToolResult, McpError> {
        let files = self
            .client()?
            .list_files_in_vault()
            .await
            .map_err(to_mcp_error)?;

        json_result(&files)
    }

    /// List files in a vault directory
    #[tool(
        name = "obsidian_list_files_in_dir",
        description = "Lists all files and directories that exist in a specific Obsidian directory."
    )]
    pub async fn list_files_in_dir(
        &self,
        params: Parameters<ListFilesInDirParams>,
    ) -> Result<CallToolResult, McpError> {
        let files = self
            .client()?
            .list_files_in_dir(&params.0.dirpath)
            .await
            .map_err(to_mcp_error)?;

        json_result(&files)
    }

    /// Read a single note
    #[tool(
        name = "obsidian_get_file_contents",
        description = "Return the content of a single file in your vault."
    )]
    pub async fn get_file_contents(
        &self,
        params: Parameters<GetFileContentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = self
            .client()?
            .get_file_contents(&params.0.filepath)
            .await
            .map_err(to_mcp_error)?;

        Ok(text_result(content))
    }

    /// Read several notes at once, inlining per-file errors
    #[tool(
        name = "obsidian_batch_get_file_contents",
        description = "Return the contents of multiple files in your vault, concatenated with headers."
    )]
    pub async fn batch_get_file_contents(
        &self,
        params: Parameters<BatchGetFileContentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = self
            .client()?
            .get_batch_file_contents(&params.0.filepaths)
            .await;

        Ok(text_result(content))
    }

    /// Plain text search
    #[tool(
        name = "obsidian_simple_search",
        description = "Simple search for documents matching a specified text query across all files in the vault. Use this tool when you want to do a simple text search"
    )]
    pub async fn simple_search(
        &self,
        params: Parameters<SimpleSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let SimpleSearchParams {
            query,
            context_length,
        } = params.0;

        let hits = self
            .client()?
            .search(&query, context_length)
            .await
            .map_err(to_mcp_error)?;

        let results: Vec<SearchResultItem> =
            hits.into_iter().map(SearchResultItem::from).collect();
        json_result(&results)
    }

    /// JsonLogic search
    #[tool(
        name = "obsidian_complex_search",
        description = "Complex search for documents using a JsonLogic query. Supports standard JsonLogic operators plus 'glob' and 'regexp' for pattern matching. Results must be non-falsy. Use this tool when you want to do a complex search, e.g. for all documents with certain tags etc."
    )]
    pub async fn complex_search(
        &self,
        params: Parameters<ComplexSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = serde_json::Value::Object(params.0.query);

        let results = self
            .client()?
            .search_json(&query)
            .await
            .map_err(to_mcp_error)?;

        json_result(&results)
    }

    /// Append to a note, creating it if needed
    #[tool(
        name = "obsidian_append_content",
        description = "Append content to a new or existing file in the vault."
    )]
    pub async fn append_content(
        &self,
        params: Parameters<AppendContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let AppendContentParams { filepath, content } = params.0;

        self.client()?
            .append_content(&filepath, &content)
            .await
            .map_err(to_mcp_error)?;

        Ok(text_result(format!(
            "Successfully appended content to {}",
            filepath
        )))
    }

    /// Patch relative to a heading, block reference or frontmatter field
    #[tool(
        name = "obsidian_patch_content",
        description = "Insert content into an existing note relative to a heading, block reference, or frontmatter field."
    )]
    pub async fn patch_content(
        &self,
        params: Parameters<PatchContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let client = self.client()?;

        // Check heading targets up front so a near miss gets a useful answer
        if params.target_type == TargetType::Heading {
            let headings = client.find_headings(&params.filepath).await;
            let exact = headings.iter().any(|h| h.path == params.target);

            if !headings.is_empty() && !exact && !params.create_if_missing {
                let similar = similar_heading_paths(&headings, &params.target);
                if !similar.is_empty() {
                    return Ok(text_result(similar_headings_message(
                        &params.target,
                        &similar,
                        params.trim_whitespace,
                    )));
                }
            }
        }

        let options = PatchOptions {
            create_if_missing: params.create_if_missing,
            trim_whitespace: params.trim_whitespace,
        };

        client
            .patch_with_fallback(
                &params.filepath,
                params.operation.as_str(),
                params.target_type.as_str(),
                &params.target,
                &params.content,
                options,
                params.fallback_operation,
            )
            .await
            .map_err(|err| patch_error(err, params.target_type))?;

        Ok(text_result(format!(
            "Successfully patched content in {}",
            params.filepath
        )))
    }

    /// Delete a file or directory, only with confirm=true
    #[tool(
        name = "obsidian_delete_file",
        description = "Delete a file or directory from the vault."
    )]
    pub async fn delete_file(
        &self,
        params: Parameters<DeleteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let DeleteFileParams { filepath, confirm } = params.0;

        if !confirm {
            return Err(McpError::invalid_params(
                "confirm must be set to true to delete a file",
                None,
            ));
        }

        self.client()?
            .delete_file(&filepath)
            .await
            .map_err(to_mcp_error)?;

        Ok(text_result(format!("Successfully deleted {}", filepath)))
    }

    /// Current periodic note
    #[tool(
        name = "obsidian_get_periodic_note",
        description = "Get current periodic note for the specified period."
    )]
    pub async fn get_periodic_note(
        &self,
        params: Parameters<PeriodicNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = self
            .client()?
            .get_periodic_note(params.0.period)
            .await
            .map_err(to_mcp_error)?;

        Ok(text_result(content))
    }

    /// Most recent periodic notes
    #[tool(
        name = "obsidian_get_recent_periodic_notes",
        description = "Get most recent periodic notes for the specified period type."
    )]
    pub async fn get_recent_periodic_notes(
        &self,
        params: Parameters<RecentPeriodicNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        let RecentPeriodicNotesParams {
            period,
            limit,
            include_content,
        } = params.0;

        ensure_positive("limit", limit)?;

        let results = self
            .client()?
            .get_recent_periodic_notes(period, limit, include_content)
            .await
            .map_err(to_mcp_error)?;

        json_result(&results)
    }

    /// Recently modified files
    #[tool(
        name = "obsidian_get_recent_changes",
        description = "Get recently modified files in the vault."
    )]
    pub async fn get_recent_changes(
        &self,
        params: Parameters<RecentChangesParams>,
    ) -> Result<CallToolResult, McpError> {
        let RecentChangesParams { limit, days } = params.0;

        ensure_positive("limit", limit)?;
        ensure_positive("days", days)?;

        let results = self
            .client()?
            .get_recent_changes(limit, days)
            .await
            .map_err(to_mcp_error)?;

        json_result(&results)
    }

    /// Add content under a heading, resolving near-miss heading names
    #[tool(
        name = "obsidian_add_to_heading",
        description = "Add content to a specific heading in a note (simplified version of patch_content)."
    )]
    pub async fn add_to_heading(
        &self,
        params: Parameters<AddToHeadingParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let client = self.client()?;
        let headings = client.find_headings(&params.filepath).await;

        if params.list_headings {
            return Ok(text_result(heading_listing(&params.filepath, &headings)));
        }

        let target = resolve_heading_target(&headings, &params.heading, params.trim_whitespace);
        let options = PatchOptions {
            create_if_missing: params.create_if_missing,
            trim_whitespace: params.trim_whitespace,
        };

        client
            .add_to_heading(
                &params.filepath,
                &target,
                &params.content,
                params.position,
                options,
            )
            .await
            .map_err(|err| add_to_heading_error(err, &params.filepath, &headings))?;

        Ok(text_result(format!(
            "Successfully added content to heading '{}' in {}",
            target, params.filepath
        )))
    }

    /// List heading paths of a note
    #[tool(
        name = "obsidian_find_headings",
        description = "List all headings in a note with their level, text and the path to use as a heading target."
    )]
    pub async fn find_headings(
        &self,
        params: Parameters<FindHeadingsParams>,
    ) -> Result<CallToolResult, McpError> {
        let headings = self.client()?.find_headings(&params.0.filepath).await;

        json_result(&headings)
    }

    /// Set a frontmatter field
    #[tool(
        name = "obsidian_set_frontmatter_field",
        description = "Set a frontmatter field in a note (simplified version of patch_content)."
    )]
    pub async fn set_frontmatter_field(
        &self,
        params: Parameters<SetFrontmatterFieldParams>,
    ) -> Result<CallToolResult, McpError> {
        let SetFrontmatterFieldParams {
            filepath,
            field,
            value,
            create_if_missing,
        } = params.0;

        self.client()?
            .set_frontmatter_field(&filepath, &field, &value, create_if_missing)
            .await
            .map_err(|err| patch_error(err, TargetType::Frontmatter))?;

        Ok(text_result(format!(
            "Successfully set frontmatter field '{}' in {}",
            field, filepath
        )))
    }

    /// Add a tag to the frontmatter
    #[tool(
        name = "obsidian_add_tag",
        description = "Add a tag to a note by updating the frontmatter tags field."
    )]
    pub async fn add_tag(
        &self,
        params: Parameters<AddTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddTagParams { filepath, tag } = params.0;

        self.client()?
            .add_tag(&filepath, &tag)
            .await
            .map_err(|err| patch_error(err, TargetType::Frontmatter))?;

        Ok(text_result(format!(
            "Successfully added tag '{}' to {}",
            tag.trim_start_matches('#'),
            filepath
        )))
    }

    /// Create a note, or append to or overwrite an existing one
    #[tool(
        name = "obsidian_create_or_update_note",
        description = "Create a new note, or update an existing one by appending (default) or overwriting its content."
    )]
    pub async fn create_or_update_note(
        &self,
        params: Parameters<CreateOrUpdateNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateOrUpdateNoteParams {
            filepath,
            content,
            overwrite,
        } = params.0;

        let outcome = self
            .client()?
            .create_or_update_note(&filepath, &content, overwrite)
            .await
            .map_err(to_mcp_error)?;

        Ok(text_result(format!(
            "Successfully {} {}",
            outcome.as_str(),
            filepath
        )))
    }
}

fn ensure_positive(name: &str, value: u32) -> Result<(), McpError> {
    if value < 1 {
        return Err(McpError::invalid_params(
            format!("Invalid {}: {}. Must be a positive integer", name, value),
            None,
        ));
    }
    Ok(())
}

#[tool_handler]
impl ServerHandler for VaultMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Obsidian MCP gives AI agents access to an Obsidian vault through the Local REST API plugin.\n\n\
                 Reading:\n\
                 - obsidian_list_files_in_vault / obsidian_list_files_in_dir - browse the vault\n\
                 - obsidian_get_file_contents / obsidian_batch_get_file_contents - read notes\n\
                 - obsidian_simple_search / obsidian_complex_search - text and JsonLogic search\n\
                 - obsidian_get_periodic_note / obsidian_get_recent_periodic_notes - daily, weekly, ... notes\n\
                 - obsidian_get_recent_changes - recently modified files\n\
                 - obsidian_find_headings - heading paths usable as patch targets\n\n\
                 Writing:\n\
                 - obsidian_append_content / obsidian_create_or_update_note - add or replace note content\n\
                 - obsidian_patch_content - insert relative to a heading, block reference or frontmatter field\n\
                 - obsidian_add_to_heading / obsidian_set_frontmatter_field / obsidian_add_tag - common patches\n\
                 - obsidian_delete_file - delete a file (requires confirm=true)\n\n\
                 Heading paths join a heading with its parent using '::', e.g. 'Project::Tasks'.\n\
                 Use obsidian_find_headings before patching a heading you have not seen."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Entry point for MCP server
pub fn run_server(config: VaultConfig) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            info!(base_url = %config.base_url(), "starting MCP server on stdio");
            let service = VaultMcpServer::new(config);
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            info!("MCP server stopped");
            Ok(())
        })
}
