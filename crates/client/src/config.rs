// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `<config dir>/threadsync/config.toml` and includes:
//! - `api_base_url`: Origin of the REST API (e.g., "http://localhost:8001")
//! - `ws_url`: Issues socket endpoint; the access token is appended as `?token=`
//! - `request_timeout_secs`: Optional per-request REST timeout
//! - `[reconnect]`: Backoff policy for the socket

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use threadsync_core::Backoff;

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "threadsync";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// REST API origin. Issue endpoints live under `/api/v1/issues`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Issues socket endpoint (`ws://` or `wss://`).
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Per-request REST timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Socket reconnection policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Exponential backoff settings for the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Automatic reconnects scheduled before giving up (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first reconnect in milliseconds (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay in milliseconds (default: 30000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8001/ws/issues/".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl ReconnectConfig {
    /// Backoff policy described by these settings.
    pub fn backoff(&self) -> Backoff {
        Backoff::from_millis(self.base_delay_ms, self.max_delay_ms, self.max_attempts)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            ws_url: default_ws_url(),
            request_timeout_secs: None,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check URLs and reconnect bounds.
    pub fn validate(&self) -> Result<()> {
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "ws_url must start with ws:// or wss://, got '{}'",
                self.ws_url
            )));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        let reconnect = &self.reconnect;
        if reconnect.max_attempts == 0 {
            return Err(Error::Config(
                "reconnect.max_attempts must be at least 1".to_string(),
            ));
        }
        if reconnect.base_delay_ms == 0 || reconnect.max_delay_ms == 0 {
            return Err(Error::Config(
                "reconnect delays must be non-zero".to_string(),
            ));
        }
        if reconnect.base_delay_ms > reconnect.max_delay_ms {
            return Err(Error::Config(format!(
                "reconnect.base_delay_ms ({}) exceeds reconnect.max_delay_ms ({})",
                reconnect.base_delay_ms, reconnect.max_delay_ms
            )));
        }
        Ok(())
    }

    /// REST timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Backoff policy for the socket.
    pub fn backoff(&self) -> Backoff {
        self.reconnect.backoff()
    }
}

/// Default config location: `$XDG_CONFIG_HOME/threadsync/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
