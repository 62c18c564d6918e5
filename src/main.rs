use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use obsidian_mcp::cli::{Arguments, Command, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();
    obsidian_mcp::logging::init(args.connection.verbose);

    if matches!(args.command, Some(Command::Serve)) {
        if let Err(err) = obsidian_mcp::cli::serve(&args) {
            eprintln!("{}: {}", "Error".red().bold(), err);
            return ExitStatus::Error.into();
        }
        return ExitStatus::Success.into();
    }

    match obsidian_mcp::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{}: {}", "Error".red().bold(), err);
            ExitStatus::Error.into()
        }
    }
}
