//! Client Configuration
//!
//! Where the chat backend lives and how long to wait for it, loaded from
//! `~/.config/journita/client.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "https://travel.example.com"
//! stream_path = "/chat/stream"
//! chat_path = "/chat"
//! health_path = "/health"
//!
//! [timeouts]
//! connect_timeout_ms = 5000
//! request_timeout_ms = 60000
//! health_timeout_ms = 5000
//! ```
//!
//! # Environment Variables
//!
//! - `JOURNITA_API_URL`: backend base URL
//! - `JOURNITA_CONNECT_TIMEOUT_MS`: connect timeout
//! - `JOURNITA_REQUEST_TIMEOUT_MS`: whole-request timeout for non-streaming calls

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Server section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// Backend base URL
    pub base_url: Option<String>,
    /// Streaming chat endpoint path
    pub stream_path: Option<String>,
    /// Non-streaming chat endpoint path
    pub chat_path: Option<String>,
    /// Health endpoint path
    pub health_path: Option<String>,
}

/// Timeouts section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsToml {
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: Option<u64>,
    /// Whole-request timeout for non-streaming calls in milliseconds
    pub request_timeout_ms: Option<u64>,
    /// Health probe timeout in milliseconds
    pub health_timeout_ms: Option<u64>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Server settings
    pub server: ServerToml,
    /// Timeout settings
    pub timeouts: TimeoutsToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Streaming chat endpoint path
    pub stream_path: String,
    /// Non-streaming chat endpoint path
    pub chat_path: String,
    /// Health endpoint path
    pub health_path: String,
    /// TCP connect timeout (applies to every call)
    pub connect_timeout: Duration,
    /// Whole-request timeout (non-streaming calls only)
    pub request_timeout: Duration,
    /// Health probe timeout
    pub health_timeout: Duration,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/chat/stream".to_string(),
            chat_path: "/chat".to_string(),
            health_path: "/health".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
            health_timeout: Duration::from_secs(5),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at a specific backend
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Full URL of the streaming endpoint
    #[must_use]
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url, self.stream_path)
    }

    /// Full URL of the non-streaming endpoint
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    /// Full URL of the health endpoint
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    /// Check that the values can be used to build a client
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        for (name, path) in [
            ("stream_path", &self.stream_path),
            ("chat_path", &self.chat_path),
            ("health_path", &self.health_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must start with '/', got {path:?}"
                )));
            }
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/journita/client.toml` or
/// `~/.config/journita/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("journita").join("client.toml"))
}

/// Load configuration from the default file, then the environment
///
/// The result is not validated; apply any [`ConfigOverrides`] first, then
/// call [`ClientConfig::validate`].
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
/// A missing config file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// Like [`load_config`], the result is not validated.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    if let Some(ref url) = toml.server.base_url {
        config.base_url = normalize_base_url(url.clone());
    }
    if let Some(ref path) = toml.server.stream_path {
        config.stream_path = path.clone();
    }
    if let Some(ref path) = toml.server.chat_path {
        config.chat_path = path.clone();
    }
    if let Some(ref path) = toml.server.health_path {
        config.health_path = path.clone();
    }

    if let Some(ms) = toml.timeouts.connect_timeout_ms {
        config.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timeouts.request_timeout_ms {
        config.request_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timeouts.health_timeout_ms {
        config.health_timeout = Duration::from_millis(ms);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ClientConfig) {
    let mut applied = false;

    if let Ok(url) = std::env::var("JOURNITA_API_URL") {
        config.base_url = normalize_base_url(url);
        applied = true;
    }

    if let Ok(timeout) = std::env::var("JOURNITA_CONNECT_TIMEOUT_MS") {
        match timeout.parse() {
            Ok(ms) => {
                config.connect_timeout = Duration::from_millis(ms);
                applied = true;
            }
            Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid JOURNITA_CONNECT_TIMEOUT_MS"),
        }
    }

    if let Ok(timeout) = std::env::var("JOURNITA_REQUEST_TIMEOUT_MS") {
        match timeout.parse() {
            Ok(ms) => {
                config.request_timeout = Duration::from_millis(ms);
                applied = true;
            }
            Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid JOURNITA_REQUEST_TIMEOUT_MS"),
        }
    }

    if applied {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values supplied on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,
    /// Connect timeout override (milliseconds)
    pub connect_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set connect timeout override
    #[must_use]
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = Some(ms);
        self
    }

    /// Apply overrides to a loaded configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.base_url.is_some() || self.connect_timeout_ms.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = normalize_base_url(url.clone());
        }

        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
