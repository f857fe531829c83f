//! Application configuration file.

use std::path::Path;

use anyhow::Context;
use auth_manager_gw::AuthManagerGwConfig;
use serde::Deserialize;
use static_auth_plugin::StaticAuthPluginConfig;

/// Root of the YAML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub auth_manager: AuthManagerGwConfig,
    pub static_auth_plugin: StaticAuthPluginConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Load the configuration at `path`.
    ///
    /// A missing file yields the defaults unless `required` is set.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails if `raw` is not a valid configuration document.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        serde_saphyr::from_str(raw).map_err(|e| anyhow::anyhow!("{e}"))
    }
}
