use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::vault::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_READ_TIMEOUT,
    VaultConfig,
};

pub const CONFIG_FILE_NAME: &str = "obsidian-mcp.json";

pub const API_KEY_ENV: &str = "OBSIDIAN_API_KEY";

const SUPPORTED_PROTOCOLS: &[&str] = &["http", "https"];

/// Connection settings as read from the config file.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub verify_ssl: bool,
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            protocol: default_protocol(),
            host: default_host(),
            port: default_port(),
            verify_ssl: false,
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROTOCOLS.contains(&self.protocol.as_str()) {
            bail!(
                "Invalid protocol \"{}\" (expected one of: {})",
                self.protocol,
                SUPPORTED_PROTOCOLS.join(", ")
            );
        }
        if self.host.trim().is_empty() {
            bail!("Host cannot be empty");
        }
        if self.port == 0 {
            bail!("Port must be greater than 0");
        }
        Ok(())
    }

    /// Apply command-line and environment overrides on top of the file values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(api_key) = &overrides.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(protocol) = &overrides.protocol {
            self.protocol = protocol.clone();
        }
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(verify_ssl) = overrides.verify_ssl {
            self.verify_ssl = verify_ssl;
        }
    }

    /// Build the client configuration. Fails when no API key is set.
    pub fn into_vault_config(self) -> Result<VaultConfig> {
        self.validate()?;

        let Some(api_key) = self.api_key.filter(|key| !key.trim().is_empty()) else {
            bail!("{} environment variable required", API_KEY_ENV);
        };

        Ok(VaultConfig {
            protocol: self.protocol,
            host: self.host,
            port: self.port,
            api_key,
            verify_ssl: self.verify_ssl,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }
}

/// Values taken from flags or environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub verify_ssl: Option<bool>,
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

/// Load the config file.
///
/// An explicit path must exist. Otherwise `obsidian-mcp.json` in `dir` is
/// used when present, and defaults when not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ConfigLoadResult> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => Some(dir.join(CONFIG_FILE_NAME)).filter(|path| path.exists()),
    };

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

/// Resolve the client configuration from the config file and overrides.
pub fn resolve_vault_config(overrides: &ConfigOverrides, dir: &Path) -> Result<VaultConfig> {
    let ConfigLoadResult { mut config, .. } = load_config(overrides.config_file.as_deref(), dir)?;
    config.apply(overrides);
    config.into_vault_config()
}
