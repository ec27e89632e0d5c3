//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides for secrets and completion API settings, and defines the default
//! paths, header names and log settings. `AppConfig` is the root configuration
//! struct containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default snapshot file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "disaster_data.json";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "incident_registry=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Cache-Control for authenticated API responses; records change on every registration
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// User agent sent to the completion API
pub const USER_AGENT: &str = formatcp!(
    "{}/{}",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_VERSION")
);

// =============================================================================
// Environment Overrides
// =============================================================================

pub const ENV_API_KEY: &str = "REGISTRY_API_KEY";
pub const ENV_COMPLETION_ENDPOINT: &str = "AZURE_ENDPOINT";
pub const ENV_COMPLETION_DEPLOYMENT: &str = "AZURE_DEPLOYMENT";
pub const ENV_COMPLETION_API_VERSION: &str = "AZURE_API_VERSION";
pub const ENV_COMPLETION_API_KEY: &str = "AZURE_API_KEY";

// =============================================================================
// Completion Defaults
// =============================================================================

/// Sampling temperature for chat completions
pub const COMPLETION_TEMPERATURE: f32 = 0.7;

/// Connect timeout for the completion API in seconds
pub const COMPLETION_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub tls: TlsConfig,
}

/// TLS mode for the HTTP listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain HTTP, for development or when running behind a reverse proxy
    #[default]
    None,
    /// User-provided certificate and key files
    Manual,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub mode: TlsMode,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Snapshot storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_data_file")]
    pub data_file: PathBuf,
    /// Start empty instead of failing when the snapshot cannot be parsed
    #[serde(default)]
    pub tolerate_corrupt_snapshot: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: Self::default_data_file(),
            tolerate_corrupt_snapshot: false,
        }
    }
}

impl StorageConfig {
    fn default_data_file() -> PathBuf {
        PathBuf::from(DEFAULT_DATA_FILE)
    }
}

/// Shared-secret settings
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Chat-completion API connection settings
#[derive(Clone, Deserialize)]
pub struct CompletionConfig {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "CompletionConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: None,
            api_version: None,
            api_key: None,
            timeout_seconds: Self::default_timeout(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl CompletionConfig {
    fn default_timeout() -> u64 {
        60
    }

    /// Full chat-completions URL for the configured deployment.
    ///
    /// Only meaningful after `AppConfig::validate` has succeeded.
    pub fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.as_deref().unwrap_or_default().trim_end_matches('/'),
            self.deployment.as_deref().unwrap_or_default(),
            self.api_version.as_deref().unwrap_or_default(),
        )
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load the config file, apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        };

        set(&mut self.auth.api_key, ENV_API_KEY);
        set(&mut self.completion.endpoint, ENV_COMPLETION_ENDPOINT);
        set(&mut self.completion.deployment, ENV_COMPLETION_DEPLOYMENT);
        set(&mut self.completion.api_version, ENV_COMPLETION_API_VERSION);
        set(&mut self.completion.api_key, ENV_COMPLETION_API_KEY);
    }

    /// Secrets and completion settings have no built-in fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.auth.api_key, "auth.api_key", ENV_API_KEY),
            (&self.completion.endpoint, "completion.endpoint", ENV_COMPLETION_ENDPOINT),
            (&self.completion.deployment, "completion.deployment", ENV_COMPLETION_DEPLOYMENT),
            (&self.completion.api_version, "completion.api_version", ENV_COMPLETION_API_VERSION),
            (&self.completion.api_key, "completion.api_key", ENV_COMPLETION_API_KEY),
        ];

        for (value, name, env) in required {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{} is not set (config file or {} environment variable)",
                    name, env
                )));
            }
        }

        if self.http.tls.mode == TlsMode::Manual
            && (self.http.tls.cert_path.is_none() || self.http.tls.key_path.is_none())
        {
            return Err(ConfigError::Validation(
                "http.tls.mode = \"manual\" requires cert_path and key_path".to_string(),
            ));
        }

        Ok(())
    }

    /// The shared secret. Empty only if `validate` was skipped.
    pub fn api_key(&self) -> &str {
        self.auth.api_key.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
