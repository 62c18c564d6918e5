use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vault::{HeadingPosition, MatchSpan, PatchOperation, Period, SearchHit, TargetType};

pub const DEFAULT_CONTEXT_LENGTH: u32 = 100;
pub const DEFAULT_PERIODIC_LIMIT: u32 = 5;
pub const DEFAULT_CHANGES_LIMIT: u32 = 10;
pub const DEFAULT_CHANGES_DAYS: u32 = 90;

fn default_context_length() -> u32 {
    DEFAULT_CONTEXT_LENGTH
}

fn default_periodic_limit() -> u32 {
    DEFAULT_PERIODIC_LIMIT
}

fn default_changes_limit() -> u32 {
    DEFAULT_CHANGES_LIMIT
}

fn default_changes_days() -> u32 {
    DEFAULT_CHANGES_DAYS
}

fn default_true() -> bool {
    true
}

// ============================================================
// File Params
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFilesInDirParams {
    /// Path to list files from (relative to your vault root). Note that empty directories will not be returned.
    pub dirpath: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFileContentsParams {
    /// Path to the relevant file (relative to your vault root).
    pub filepath: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchGetFileContentsParams {
    /// List of file paths to read (relative to your vault root)
    pub filepaths: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AppendContentParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Content to append to the file
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    /// Path to the file or directory to delete (relative to vault root)
    pub filepath: String,
    /// Confirmation to delete the file (must be true)
    pub confirm: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOrUpdateNoteParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Content for the note
    pub content: String,
    /// Whether to overwrite an existing note instead of appending to it (default: false)
    #[serde(default)]
    pub overwrite: bool,
}

// ============================================================
// Search Params
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimpleSearchParams {
    /// Text to a simple search for in the vault.
    pub query: String,
    /// How much context to return around the matching string (default: 100)
    #[serde(default = "default_context_length")]
    pub context_length: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ComplexSearchParams {
    /// JsonLogic query object. Example: {"glob": ["*.md", {"var": "path"}]} matches all markdown files
    pub query: Map<String, Value>,
}

/// A simple search result as returned to the agent.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchResultItem {
    pub filename: String,
    pub score: f64,
    pub matches: Vec<SearchResultMatch>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchResultMatch {
    pub context: String,
    pub match_position: MatchSpan,
}

impl From<SearchHit> for SearchResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            filename: hit.filename,
            score: hit.score,
            matches: hit
                .matches
                .into_iter()
                .map(|m| SearchResultMatch {
                    context: m.context,
                    match_position: m.span,
                })
                .collect(),
        }
    }
}

// ============================================================
// Patch Params
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PatchContentParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Operation to perform (append, prepend, or replace)
    pub operation: PatchOperation,
    /// Type of target to patch
    pub target_type: TargetType,
    /// Target identifier (heading path, block reference, or frontmatter field)
    pub target: String,
    /// Content to insert
    pub content: String,
    /// Whether to create the target if it doesn't exist (default: false)
    #[serde(default)]
    pub create_if_missing: bool,
    /// Whether to trim whitespace from target before matching (default: false)
    #[serde(default)]
    pub trim_whitespace: bool,
    /// Operation to retry with when the first attempt fails (optional)
    #[serde(default)]
    pub fallback_operation: Option<PatchOperation>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddToHeadingParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Heading text (exact match or partial match with trim_whitespace=true)
    pub heading: String,
    /// Content to add to the heading section
    pub content: String,
    /// Where to add the content - start or end of the section (default: end)
    #[serde(default)]
    pub position: HeadingPosition,
    /// Whether to trim whitespace from heading before matching (default: true)
    #[serde(default = "default_true")]
    pub trim_whitespace: bool,
    /// Whether to create the heading if it doesn't exist (default: false)
    #[serde(default)]
    pub create_if_missing: bool,
    /// If true, returns a list of all headings in the file before proceeding (default: false)
    #[serde(default)]
    pub list_headings: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindHeadingsParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetFrontmatterFieldParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Frontmatter field name
    pub field: String,
    /// Value to set
    pub value: String,
    /// Whether to create the field if it doesn't exist (default: true)
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTagParams {
    /// Path to the file (relative to vault root)
    pub filepath: String,
    /// Tag to add (a leading # is ignored)
    pub tag: String,
}

// ============================================================
// Periodic Note Params
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PeriodicNoteParams {
    /// The period type (daily, weekly, monthly, quarterly, yearly)
    pub period: Period,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentPeriodicNotesParams {
    /// The period type (daily, weekly, monthly, quarterly, yearly)
    pub period: Period,
    /// Maximum number of notes to return (default: 5)
    #[serde(default = "default_periodic_limit")]
    #[schemars(range(min = 1, max = 50))]
    pub limit: u32,
    /// Whether to include note content (default: false)
    #[serde(default)]
    pub include_content: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentChangesParams {
    /// Maximum number of files to return (default: 10)
    #[serde(default = "default_changes_limit")]
    #[schemars(range(min = 1, max = 100))]
    pub limit: u32,
    /// Only include files modified within this many days (default: 90)
    #[serde(default = "default_changes_days")]
    #[schemars(range(min = 1))]
    pub days: u32,
}
