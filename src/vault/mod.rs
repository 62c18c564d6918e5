//! Client for the Obsidian Local REST API.
//!
//! ## Module Structure
//!
//! - `client`: Connection settings and one method per REST endpoint
//! - `error`: Error type with operation context and suggestions
//! - `headings`: Heading extraction used to resolve patch targets
//! - `notes`: Note operations composed from the raw endpoints
//! - `path`: Vault-relative path normalization
//! - `types`: Enumerations and response records

mod client;
mod error;
mod headings;
mod notes;
mod path;
mod types;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_READ_TIMEOUT,
    VaultClient, VaultConfig,
};
pub use error::{ApiFailure, ErrorContext, RequestFailure, VaultError};
pub use headings::{HEADING_PATH_DELIMITER, Heading, parse_headings};
pub use notes::NoteWrite;
pub use path::normalize_path;
pub use types::{
    HeadingPosition, MatchSpan, PatchOperation, PatchOptions, Period, SearchHit, SearchMatch,
    TargetType,
};
