//! TOML Configuration File Support
//!
//! Configuration for reelchat is read from `~/.config/reelchat/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (`REELCHAT_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/reelchat/config.toml` (typically `~/.config/reelchat/config.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [gateway]
//! endpoint = "http://localhost:3000/api/chat"
//! timeout_secs = 30
//! max_retries = 0
//! initial_backoff_ms = 250
//! max_backoff_ms = 4000
//!
//! [reveal]
//! interval_ms = 20
//!
//! [chat]
//! max_input_length = 4000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::{ChatConfig, DEFAULT_MAX_INPUT_LENGTH};
use crate::gateway::{HttpGateway, RetryPolicy, DEFAULT_TIMEOUT};
use crate::reveal::DEFAULT_REVEAL_INTERVAL;

/// Default chat proxy endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/chat";

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

/// Tracks where a configuration value came from
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

/// Gateway section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayToml {
    /// Chat proxy URL
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Retries after a transient failure (0 = single attempt)
    pub max_retries: Option<u32>,

    /// First retry delay in milliseconds
    pub initial_backoff_ms: Option<u64>,

    /// Retry delay ceiling in milliseconds
    pub max_backoff_ms: Option<u64>,
}

/// Reveal section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Delay between revealed characters in milliseconds
    pub interval_ms: Option<u64>,
}

/// Chat section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Maximum input length in characters
    pub max_input_length: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelchatToml {
    /// Gateway configuration section
    pub gateway: GatewayToml,

    /// Reveal configuration section
    pub reveal: RevealToml,

    /// Chat configuration section
    pub chat: ChatToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for a reelchat process
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct ReelchatConfig {
    /// Chat proxy URL
    pub endpoint: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Retry policy for transient gateway failures
    pub retry: RetryPolicy,

    /// Delay between revealed characters
    pub reveal_interval: Duration,

    /// Maximum input length in characters
    pub max_input_length: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ReelchatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ReelchatConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check that the values can actually be used
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a non-HTTP endpoint or a
    /// zero timeout, reveal interval, or input length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "gateway timeout must be greater than zero".to_string(),
            ));
        }
        if self.reveal_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "reveal interval must be greater than zero".to_string(),
            ));
        }
        if self.max_input_length == 0 {
            return Err(ConfigError::ValidationError(
                "max input length must be greater than zero".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(format!(
                "initial backoff ({}ms) exceeds max backoff ({}ms)",
                self.retry.initial_backoff_ms, self.retry.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Session settings derived from this configuration
    #[must_use]
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            reveal_interval: self.reveal_interval,
            max_input_length: self.max_input_length,
        }
    }

    /// HTTP gateway built from this configuration
    #[must_use]
    pub fn http_gateway(&self) -> HttpGateway {
        HttpGateway::new(self.endpoint.clone())
            .with_timeout(self.request_timeout)
            .with_retry(self.retry.clone())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/reelchat/config.toml` or
/// `~/.config/reelchat/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reelchat").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI arguments are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ReelchatConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ReelchatConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path, reading variables through `env`
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ReelchatConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ReelchatConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ReelchatToml = toml::from_str(&toml_content)?;
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

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ReelchatConfig, toml: &ReelchatToml) {
    if let Some(ref endpoint) = toml.gateway.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(secs) = toml.gateway.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = toml.gateway.max_retries {
        config.retry.max_retries = retries;
    }
    if let Some(ms) = toml.gateway.initial_backoff_ms {
        config.retry.initial_backoff_ms = ms;
    }
    if let Some(ms) = toml.gateway.max_backoff_ms {
        config.retry.max_backoff_ms = ms;
    }

    if let Some(ms) = toml.reveal.interval_ms {
        config.reveal_interval = Duration::from_millis(ms);
    }

    if let Some(length) = toml.chat.max_input_length {
        config.max_input_length = length;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ReelchatConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = env("REELCHAT_ENDPOINT") {
        config.endpoint = endpoint;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("REELCHAT_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(retries) = env("REELCHAT_MAX_RETRIES") {
        if let Ok(n) = retries.parse::<u32>() {
            config.retry.max_retries = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(interval) = env("REELCHAT_REVEAL_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.reveal_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(length) = env("REELCHAT_MAX_INPUT_LENGTH") {
        if let Ok(l) = length.parse::<usize>() {
            config.max_input_length = l;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub endpoint: Option<String>,
    /// Request timeout override (seconds)
    pub timeout_secs: Option<u64>,
    /// Retry count override
    pub max_retries: Option<u32>,
    /// Reveal interval override (milliseconds)
    pub reveal_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set retry count override
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set reveal interval override
    #[must_use]
    pub fn with_reveal_interval_ms(mut self, ms: u64) -> Self {
        self.reveal_interval_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ReelchatConfig) {
        if self.endpoint.is_some()
            || self.timeout_secs.is_some()
            || self.max_retries.is_some()
            || self.reveal_interval_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.max_retries {
            config.retry.max_retries = retries;
        }
        if let Some(ms) = self.reveal_interval_ms {
            config.reveal_interval = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
