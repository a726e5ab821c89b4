//! Configuration resolution for Permit.
//!
//! Resolution order:
//! 1. Built-in defaults
//! 2. Optional JSON settings file
//! 3. Environment variables (highest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Complete Permit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Broker behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// First platform version that enforces runtime permission prompts.
    /// Below it every declared permission is treated as granted.
    pub runtime_permissions_min_version: u32,
    /// Largest ticket handed out before the generator wraps back to 1.
    pub ticket_limit: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            runtime_permissions_min_version: 23,
            ticket_limit: 0xFFFF, // 16-bit request code space
        }
    }
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "permit_core=info".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(settings_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(path) = settings_path {
        if path.exists() {
            config = load_config_file(path)?;
        }
    }

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("PERMIT_MIN_RUNTIME_VERSION") {
        if let Ok(n) = val.parse() {
            config.broker.runtime_permissions_min_version = n;
        }
    }
    if let Ok(val) = std::env::var("PERMIT_TICKET_LIMIT") {
        if let Ok(n) = val.parse() {
            config.broker.ticket_limit = n;
        }
    }
    if let Ok(val) = std::env::var("PERMIT_LOG_FILTER") {
        config.logging.filter = val;
    }
    if let Ok(val) = std::env::var("PERMIT_LOG_JSON") {
        config.logging.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.broker.ticket_limit == 0 {
        return Err(Error::Config("ticket_limit must be at least 1".to_string()));
    }
    Ok(())
}
