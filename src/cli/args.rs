//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `serve`: Start the MCP server on stdio
//! - `headings`: Print the heading paths of a note
//!
//! Connection options are global so they can follow any subcommand. Each
//! one also reads an `OBSIDIAN_*` environment variable.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Options selecting and authenticating the Local REST API.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Config file path (default: ./obsidian-mcp.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API key of the Local REST API plugin
    #[arg(long, env = "OBSIDIAN_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Host running Obsidian (default: 127.0.0.1)
    #[arg(long, env = "OBSIDIAN_HOST", global = true)]
    pub host: Option<String>,

    /// Port of the Local REST API (default: 27124)
    #[arg(long, env = "OBSIDIAN_PORT", global = true)]
    pub port: Option<u16>,

    /// Protocol, http or https (default: https)
    #[arg(long, env = "OBSIDIAN_PROTOCOL", global = true)]
    pub protocol: Option<String>,

    /// Verify the TLS certificate of the API (default: false)
    #[arg(
        long,
        env = "OBSIDIAN_VERIFY_SSL",
        global = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub verify_ssl: Option<bool>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl From<&ConnectionArgs> for ConfigOverrides {
    fn from(args: &ConnectionArgs) -> Self {
        Self {
            config_file: args.config.clone(),
            api_key: args.api_key.clone(),
            protocol: args.protocol.clone(),
            host: args.host.clone(),
            port: args.port,
            verify_ssl: args.verify_ssl,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start MCP server for AI coding agents
    Serve,
    /// Print the heading paths of a note, usable as patch targets
    Headings {
        /// Path to the note (relative to vault root)
        filepath: String,
    },
}
