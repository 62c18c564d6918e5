//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the Obsidian vault to AI assistants as MCP tools.
//! Every tool call builds a fresh [`VaultClient`](crate::vault::VaultClient)
//! from the shared configuration.
//!
//! ## Module Structure
//!
//! - `helpers`: Result wrapping, error mapping and heading suggestions
//! - `server`: Main MCP server implementation
//! - `types`: Tool parameter and result types

mod helpers;
mod server;
pub mod types;

pub use server::{VaultMcpServer, run_server};
