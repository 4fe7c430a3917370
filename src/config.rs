//! Configuration system
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `INFLUXQ_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Use HTTPS instead of HTTP
    #[serde(default)]
    pub ssl: bool,

    /// Database to select after connecting; empty keeps the server default
    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_timeout() -> u64 {
    30
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: false,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ConnectionConfig {
    /// Base URL for the HTTP query endpoint, `<scheme>://<host>:<port>/`
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("failed to parse {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("influxq").join("config.toml")),
            Some(PathBuf::from("/etc/influxq/config.toml")),
            Some(PathBuf::from("./influxq.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INFLUXQ_HOST") {
            self.connection.host = host;
        }
        if let Ok(port) = std::env::var("INFLUXQ_PORT") {
            if let Ok(p) = port.parse() {
                self.connection.port = p;
            }
        }
        if let Ok(ssl) = std::env::var("INFLUXQ_SSL") {
            self.connection.ssl = matches!(ssl.as_str(), "1" | "true" | "yes");
        }
        if let Ok(database) = std::env::var("INFLUXQ_DATABASE") {
            self.connection.database = database;
        }
        if let Ok(username) = std::env::var("INFLUXQ_USERNAME") {
            self.connection.username = username;
        }
        if let Ok(password) = std::env::var("INFLUXQ_PASSWORD") {
            self.connection.password = password;
        }
        if let Ok(timeout) = std::env::var("INFLUXQ_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.connection.timeout_secs = t;
            }
        }
        if let Ok(level) = std::env::var("INFLUXQ_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
