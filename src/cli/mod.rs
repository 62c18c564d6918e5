use anyhow::Result;

use crate::mcp::run_server;

mod args;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, ConnectionArgs};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}

/// Resolve the configuration and run the MCP server until stdin closes.
pub fn serve(args: &Arguments) -> Result<()> {
    let config = run::vault_config(&args.connection)?;
    run_server(config)
}
