//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API and HTTP behavior settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local document and export locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Salary conversion rules
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or cannot be parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.per_page == 0 || self.api.per_page > 100 {
            return Err(AppError::validation("api.per_page must be within 1..=100"));
        }
        if self.storage.vacancies_file.trim().is_empty() {
            return Err(AppError::validation("storage.vacancies_file is empty"));
        }
        if self.storage.csv_file.trim().is_empty() {
            return Err(AppError::validation("storage.csv_file is empty"));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

/// Remote API and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.hh.ru`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Search results per page
    #[serde(default = "defaults::per_page")]
    pub per_page: u32,

    /// Extra attempts for transient failures
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Initial backoff between attempts in milliseconds, doubled each retry
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            per_page: defaults::per_page(),
            max_retries: defaults::max_retries(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Local file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding stored vacancies
    #[serde(default = "defaults::vacancies_file")]
    pub vacancies_file: String,

    /// Default CSV export target
    #[serde(default = "defaults::csv_file")]
    pub csv_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            vacancies_file: defaults::vacancies_file(),
            csv_file: defaults::csv_file(),
        }
    }
}

/// Salary conversion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Reject vacancies whose salary currency is missing from the rate table
    #[serde(default)]
    pub strict_currency: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Parsed `level`, e.g. `info` or `debug`.
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| AppError::config(format!("unknown log level {:?}", self.level)))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "https://api.hh.ru".into()
    }
    pub fn user_agent() -> String {
        "HH-User-Agent".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn per_page() -> u32 {
        100
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        500
    }

    // Storage defaults
    pub fn vacancies_file() -> String {
        "data/vacancies.json".into()
    }
    pub fn csv_file() -> String {
        "data/vacancies.csv".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
