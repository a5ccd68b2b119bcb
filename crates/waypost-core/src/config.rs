//! Configuration system for waypost.
//!
//! Resolution order: environment variables → config file → defaults.
//! Binaries layer their command-line flags on top.
//!
//! Config file location:
//!   1. $WAYPOST_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/waypost/config.toml
//!   3. ~/.config/waypost/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::windows::Windows;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypostConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the registry listens on.
    pub bind_addr: String,
    pub port: u16,
    /// How long a renewal keeps a record discoverable.
    pub active_window_secs: u64,
    /// How long a record is kept (listed but not discoverable) before purge.
    pub retention_window_secs: u64,
    /// Append logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

/// Basic-auth credentials. Both empty = every request is allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the registry, e.g. http://127.0.0.1:8080
    pub registry_url: String,
    /// Sent verbatim as the Authorization header.
    pub token: String,
    pub timeout_ms: u64,
    /// Renewal period used by `announce`.
    pub renew_interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        let windows = Windows::default();
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            active_window_secs: windows.active.as_secs(),
            retention_window_secs: windows.retention.as_secs(),
            log_file: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            registry_url: "http://127.0.0.1:8080".to_string(),
            token: String::new(),
            timeout_ms: 5_000,
            renew_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn windows(&self) -> Windows {
        Windows::new(
            Duration::from_secs(self.active_window_secs),
            Duration::from_secs(self.retention_window_secs),
        )
    }
}

impl AuthConfig {
    /// Credentials to enforce, or None when auth is disabled.
    pub fn credentials(&self) -> Result<Option<(&str, &str)>, ConfigError> {
        match (self.username.is_empty(), self.password.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some((&self.username, &self.password))),
            _ => Err(ConfigError::Invalid(
                "basic auth requires both username and password".to_string(),
            )),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn renew_interval(&self) -> Duration {
        Duration::from_secs(self.renew_interval_secs)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("waypost")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl WaypostConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&Self::file_path())
    }

    /// Like [`load`](Self::load) but reads an explicit file.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(WaypostConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("WAYPOST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        Self::write_default_to(&path)?;
        Ok(path)
    }

    fn write_default_to(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text = toml::to_string_pretty(&WaypostConfig::default())
            .map_err(ConfigError::SerializeFailed)?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))
    }

    /// Apply WAYPOST_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("WAYPOST_SERVER__BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(p) = lookup("WAYPOST_SERVER__PORT").and_then(|v| v.parse().ok()) {
            self.server.port = p;
        }
        if let Some(s) = lookup("WAYPOST_SERVER__ACTIVE_WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.server.active_window_secs = s;
        }
        if let Some(s) = lookup("WAYPOST_SERVER__RETENTION_WINDOW_SECS").and_then(|v| v.parse().ok())
        {
            self.server.retention_window_secs = s;
        }
        if let Some(v) = lookup("WAYPOST_SERVER__LOG_FILE") {
            self.server.log_file = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lookup("WAYPOST_AUTH__USERNAME") {
            self.auth.username = v;
        }
        if let Some(v) = lookup("WAYPOST_AUTH__PASSWORD") {
            self.auth.password = v;
        }
        if let Some(v) = lookup("WAYPOST_CLIENT__REGISTRY_URL") {
            self.client.registry_url = v;
        }
        if let Some(v) = lookup("WAYPOST_CLIENT__TOKEN") {
            self.client.token = v;
        }
        if let Some(ms) = lookup("WAYPOST_CLIENT__TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.client.timeout_ms = ms;
        }
        if let Some(s) = lookup("WAYPOST_CLIENT__RENEW_INTERVAL_SECS").and_then(|v| v.parse().ok())
        {
            self.client.renew_interval_secs = s;
        }
    }
}
