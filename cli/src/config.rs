//! Operator configuration with TOML file support.

use qd_types::WalletAddress;
use qd_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for `qd-reward`.
///
/// Can be loaded from a TOML file via [`RewardConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Ether to split across the round's contributors.
    #[serde(default)]
    pub reward_pool: f64,

    /// Wallets allowed to trigger payments and change the pool.
    #[serde(default)]
    pub operators: Vec<WalletAddress>,

    /// Endpoint of the signer service that executes transfers.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Per-request timeout applied by the HTTP gateway, in seconds.
    #[serde(default = "default_gateway_timeout_secs")]
    pub gateway_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_gateway_url() -> String {
    "http://127.0.0.1:8550/transfer".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RewardConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("RewardConfig is always serializable to TOML")
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            reward_pool: 0.0,
            operators: Vec::new(),
            gateway_url: default_gateway_url(),
            gateway_timeout_secs: default_gateway_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
