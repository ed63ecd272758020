//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::models::DEFAULT_ICON_BASE_URL;

/// Largest batch width accepted; the remote service is a small community API.
pub const MAX_CONCURRENCY: usize = 16;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Remote stats service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Public profile page shown for unknown players; `{name}` is substituted
    #[serde(default = "default_profile_url_template")]
    pub profile_url_template: String,

    /// Where hero head icons live
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("rivals-stats/{}", env!("CARGO_PKG_VERSION"))
}

fn default_profile_url_template() -> String {
    "https://tracker.gg/marvel-rivals/profile/ign/{name}/overview".to_string()
}

fn default_icon_base_url() -> String {
    DEFAULT_ICON_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            profile_url_template: default_profile_url_template(),
            icon_base_url: default_icon_base_url(),
        }
    }
}

impl ApiConfig {
    /// HTTP client settings derived from this section.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("api.base_url {}: {}", self.base_url, e))
        })?;

        Ok(ClientConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        })
    }

    /// Public profile page for a player.
    pub fn profile_url(&self, name: &str) -> String {
        let raw = self.profile_url_template.replace("{name}", name);
        Url::parse(&raw).map(String::from).unwrap_or(raw)
    }
}

/// Batch lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrent in-flight lookups
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Text detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,

    #[serde(default = "default_language")]
    pub language: String,

    /// Tesseract `--psm`; 6 treats the leaderboard as one uniform block
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: u8,
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_psm() -> u8 {
    6
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: default_tesseract_path(),
            language: default_language(),
            page_segmentation_mode: default_psm(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            batch: BatchConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        let base_url = self.api.client_config()?.base_url;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url cannot be used as an API root: {}",
                base_url
            )));
        }

        if !self.api.profile_url_template.contains("{name}") {
            return Err(ConfigError::ValidationError(
                "api.profile_url_template must contain {name}".to_string(),
            ));
        }

        if self.batch.concurrency == 0 || self.batch.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ValidationError(format!(
                "batch.concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }

        Ok(())
    }
}
