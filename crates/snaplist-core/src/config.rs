//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/snaplist/config.toml)
//! 3. Environment variables (SNAPLIST_* prefix)
//!
//! Environment variables take precedence over config file values.
//! The same file serves both the server and the client; each side reads
//! the fields it needs.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::ReconnectPolicy;

/// Environment variable prefix
const ENV_PREFIX: &str = "SNAPLIST";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the snaplist HTTP API (client side)
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Address the HTTP API listens on (server side)
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Key-value store URL: redis://, sqlite:// or memory://
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// First reconnect delay after losing the store connection
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,

    /// Ceiling for the reconnect delay
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,

    /// Reconnect attempts before a store operation gives up
    #[serde(default = "default_reconnect_max_attempts")]
    pub reconnect_max_attempts: u32,

    /// Client request timeout; unset means requests may wait forever
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log file for the TUI (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Directory for local files (logs, SQLite store)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            bind: default_bind(),
            store_url: default_store_url(),
            reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            reconnect_max_attempts: default_reconnect_max_attempts(),
            request_timeout_secs: None,
            log_file: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SNAPLIST_SERVER_URL, SNAPLIST_BIND, ...)
    /// 2. Config file (~/.config/snaplist/config.toml or SNAPLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_SERVER_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.server_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_BIND", ENV_PREFIX)) {
            if !val.is_empty() {
                self.bind = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_STORE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.store_url = val;
            }
        }

        // Empty or unparsable clears the timeout
        if let Ok(val) = std::env::var(format!("{}_REQUEST_TIMEOUT_SECS", ENV_PREFIX)) {
            self.request_timeout_secs = val.parse().ok().filter(|secs| *secs > 0);
        }
    }

    /// Set a configuration value by key (used by `snaplist config set`)
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server_url" => self.server_url = value.to_string(),
            "bind" => self.bind = value.to_string(),
            "store_url" => self.store_url = value.to_string(),
            "data_dir" => self.data_dir = PathBuf::from(value),
            "reconnect_initial_delay_ms" => {
                self.reconnect_initial_delay_ms =
                    value.parse().context("Expected a number of milliseconds")?
            }
            "reconnect_max_delay_ms" => {
                self.reconnect_max_delay_ms =
                    value.parse().context("Expected a number of milliseconds")?
            }
            "reconnect_max_attempts" => {
                self.reconnect_max_attempts =
                    value.parse().context("Expected a number of attempts")?
            }
            "request_timeout_secs" => {
                self.request_timeout_secs = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.parse().context("Expected a number of seconds")?)
                }
            }
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Valid keys: server_url, bind, store_url, data_dir, \
                 reconnect_initial_delay_ms, reconnect_max_delay_ms, reconnect_max_attempts, \
                 request_timeout_secs, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SNAPLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snaplist")
            .join("config.toml")
    }

    /// Reconnect policy for the store backend
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.reconnect_initial_delay_ms),
            max_delay: Duration::from_millis(self.reconnect_max_delay_ms),
            max_attempts: self.reconnect_max_attempts,
        }
    }

    /// Client request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Default path of the TUI debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:3001".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_reconnect_initial_delay_ms() -> u64 {
    100
}

fn default_reconnect_max_delay_ms() -> u64 {
    5_000
}

fn default_reconnect_max_attempts() -> u32 {
    10
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snaplist")
}
