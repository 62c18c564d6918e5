use std::env;

use anyhow::{Context, Result};
use tracing::debug;

use super::{
    args::{Arguments, Command, ConnectionArgs},
    exit_status::ExitStatus,
    report,
};
use crate::config::{ConfigOverrides, resolve_vault_config};
use crate::vault::{VaultClient, VaultConfig, parse_headings};

/// Dispatch a one-shot command.
///
/// `serve` is handled by [`super::serve`] before this is reached.
pub fn run(Arguments { connection, command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Headings { filepath }) => headings(&connection, &filepath),
        Some(Command::Serve) => {
            // Serve command is handled in main.rs before calling run()
            anyhow::bail!("Serve command should be handled before run()")
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

/// Resolve the client configuration from the config file, flags and environment.
pub fn vault_config(connection: &ConnectionArgs) -> Result<VaultConfig> {
    let dir = env::current_dir().context("Failed to determine the working directory")?;
    resolve_vault_config(&ConfigOverrides::from(connection), &dir)
}

fn headings(connection: &ConnectionArgs, filepath: &str) -> Result<ExitStatus> {
    let config = vault_config(connection)?;
    debug!(base_url = %config.base_url(), %filepath, "listing headings");

    let content = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let client = VaultClient::new(&config)?;
            client.get_file_contents(filepath).await
        })?;

    let headings = parse_headings(&content);
    report::print_headings(filepath, &headings);

    Ok(ExitStatus::found(!headings.is_empty()))
}
