//! Obsidian MCP - an MCP server for Obsidian vaults
//!
//! Obsidian MCP bridges AI assistants to an Obsidian vault through the
//! Local REST API plugin. It lists, reads, searches and edits notes, and
//! resolves heading paths so content can be inserted into the right section.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and override resolution
//! - `logging`: Tracing subscriber setup
//! - `mcp`: Model Context Protocol server implementation
//! - `vault`: Local REST API client and heading extraction

pub mod cli;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod vault;
