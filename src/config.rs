//! Server configuration
//!
//! Loaded from an optional JSON file (`CHAT_CONFIG`) with environment
//! overrides. Every field has a default, so an empty document is valid.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "CHAT_CONFIG";
/// Environment override for the listen address
pub const LISTEN_ADDR_ENV: &str = "CHAT_LISTEN_ADDR";
/// Environment override for the capacity ceiling
pub const MAX_CLIENTS_ENV: &str = "CHAT_MAX_CLIENTS";

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("max_clients must be at least 1")]
    NoCapacity,

    #[error("reap_interval_secs must be at least 1")]
    InvalidReapInterval,

    #[error("max_line_length must be at least 1")]
    InvalidLineLength,

    #[error("server_name must not be empty")]
    EmptyServerName,
}

/// Chat server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the listener binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Name shown in the welcome line
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Capacity ceiling on concurrently connected clients
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// How long an empty room survives, in seconds
    #[serde(default = "default_room_retention")]
    pub room_retention_secs: u64,

    /// Reaper sweep interval, in seconds
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,

    /// Whether chat lines are echoed back to their sender
    #[serde(default = "default_echo_to_sender")]
    pub echo_to_sender: bool,

    /// Longest accepted client line, in bytes
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Config {
    /// Load from `CHAT_CONFIG` (if set) and apply environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = env::var(LISTEN_ADDR_ENV) {
            config.listen_addr = addr;
        }
        if let Ok(value) = env::var(MAX_CLIENTS_ENV) {
            config.max_clients = value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: MAX_CLIENTS_ENV,
                value,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn room_retention(&self) -> Duration {
        Duration::from_secs(self.room_retention_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_clients == 0 {
            return Err(ValidationError::NoCapacity);
        }
        if self.reap_interval_secs == 0 {
            return Err(ValidationError::InvalidReapInterval);
        }
        if self.max_line_length == 0 {
            return Err(ValidationError::InvalidLineLength);
        }
        if self.server_name.trim().is_empty() {
            return Err(ValidationError::EmptyServerName);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            server_name: default_server_name(),
            max_clients: default_max_clients(),
            room_retention_secs: default_room_retention(),
            reap_interval_secs: default_reap_interval(),
            echo_to_sender: default_echo_to_sender(),
            max_line_length: default_max_line_length(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_server_name() -> String {
    "the Server".to_string()
}

fn default_max_clients() -> usize {
    64
}

fn default_room_retention() -> u64 {
    7 * 24 * 60 * 60
}

fn default_reap_interval() -> u64 {
    60
}

fn default_echo_to_sender() -> bool {
    true
}

fn default_max_line_length() -> usize {
    4096
}
