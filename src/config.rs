// Bridge configuration
// Where the remote API lives and how the HTTP client talks to it

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PLATFORM_HOST: &str = "myshopify.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Host suffix every store lives under (`<store>.<platform_host>`)
    pub platform_host: String,
    /// URL scheme for API requests
    pub api_scheme: String,
    /// HTTP client tuning
    pub http: HttpConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            platform_host: DEFAULT_PLATFORM_HOST.to_string(),
            api_scheme: "https".to_string(),
            http: HttpConfig::default(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Retries on 429/5xx (0 = never retry)
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            connect_timeout_secs: 30,
            max_retries: 0,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Load configuration from a JSON file, or defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(BridgeConfig::default());
    };

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: BridgeConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    validate_config(&config)?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Validate bridge configuration
pub fn validate_config(config: &BridgeConfig) -> Result<(), ConfigError> {
    let host = config.platform_host.trim();
    if host.is_empty() {
        return Err(ConfigError::Invalid("platform_host cannot be empty".to_string()));
    }
    if host.contains('/') || host.contains('@') {
        return Err(ConfigError::Invalid(format!(
            "platform_host must be a bare host name, got '{}'",
            config.platform_host
        )));
    }
    if config.api_scheme != "https" && config.api_scheme != "http" {
        return Err(ConfigError::Invalid(format!(
            "api_scheme must be http or https, got '{}'",
            config.api_scheme
        )));
    }
    Ok(())
}
