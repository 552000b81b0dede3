//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub share: ShareConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Share link configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// Dashboard URL that generated links point at
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Query parameter carrying the token
    #[serde(default = "default_param")]
    pub param: String,

    /// Links longer than this are logged as a warning
    #[serde(default = "default_max_link_length")]
    pub max_link_length: usize,
}

fn default_public_url() -> String {
    "http://localhost:8085/".to_string()
}

fn default_param() -> String {
    crate::share::DEFAULT_PARAM.to_string()
}

fn default_max_link_length() -> usize {
    8000
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            param: default_param(),
            max_link_length: default_max_link_length(),
        }
    }
}

impl ShareConfig {
    /// Build the share link for `token`, warning when it gets too long
    pub fn link_for(&self, token: &str) -> String {
        let url = crate::share::share_url(&self.public_url, &self.param, token);
        if url.len() > self.max_link_length {
            tracing::warn!(
                length = url.len(),
                limit = self.max_link_length,
                "Share link exceeds configured length; browsers may truncate it"
            );
        }
        url
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
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
            dirs::config_dir().map(|p| p.join("triage-board").join("config.toml")),
            Some(PathBuf::from("/etc/triage-board/config.toml")),
            Some(PathBuf::from("./config.toml")),
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

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TRIAGE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TRIAGE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(url) = std::env::var("TRIAGE_PUBLIC_URL") {
            self.share.public_url = url;
        }

        if let Ok(level) = std::env::var("TRIAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRIAGE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Triage Board Configuration
#
# Environment variables override these settings:
# - TRIAGE_API_HOST
# - TRIAGE_API_PORT
# - TRIAGE_PUBLIC_URL
# - TRIAGE_LOG_LEVEL
# - TRIAGE_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8085

# Allowed CORS origins (empty = any origin)
cors_origins = []

# Maximum request body size (bytes)
max_body_size = 2097152

[share]
# Dashboard URL that share links point at
public_url = "http://localhost:8085/"

# Query parameter carrying the encoded dataset
param = "data"

# Warn when a generated link is longer than this
max_link_length = 8000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
