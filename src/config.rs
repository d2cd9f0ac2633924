// src/config.rs

//! Application configuration structures and loading.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::loader::LoadOptions;
use crate::logging::LogFormat;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalogue API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry behavior for list and detail fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Per-resource circuit breaker thresholds
    #[serde(default)]
    pub breakers: BreakersConfig,

    /// Safe loader behavior
    #[serde(default)]
    pub loader: LoadOptions,

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

    /// Load configuration or return default if loading fails.
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

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// `API_URL` replaces the API base URL and `LOG_FORMAT` the log format.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = LogFormat::from_str_lossy(&format);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::config("api.base_url is empty"));
        }
        Url::parse(&self.api.base_url)
            .map_err(|e| AppError::config(format!("api.base_url is not a URL: {e}")))?;
        if self.api.timeout_secs == 0 {
            return Err(AppError::config("api.timeout_secs must be > 0"));
        }
        if self.retry.max_retries == 0 {
            return Err(AppError::config("retry.max_retries must be >= 1"));
        }
        for (name, breaker) in [
            ("courses", &self.breakers.courses),
            ("blog", &self.breakers.blog),
        ] {
            if breaker.max_failures == 0 {
                return Err(AppError::config(format!(
                    "breakers.{name}.max_failures must be >= 1"
                )));
            }
            if breaker.timeout_ms == 0 {
                return Err(AppError::config(format!(
                    "breakers.{name}.timeout_ms must be > 0"
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client settings for the catalogue API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL that endpoint paths are joined onto
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds; attempt `n` waits `n * delay_ms`
    #[serde(default = "defaults::retry_delay")]
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            delay_ms: defaults::retry_delay(),
        }
    }
}

/// Thresholds for a single circuit breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens
    pub max_failures: u32,

    /// Cool-down before a trial call is let through, in milliseconds
    pub timeout_ms: u64,
}

impl BreakerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Circuit breaker settings, one per resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakersConfig {
    #[serde(default = "defaults::courses_breaker")]
    pub courses: BreakerConfig,

    #[serde(default = "defaults::blog_breaker")]
    pub blog: BreakerConfig,
}

impl Default for BreakersConfig {
    fn default() -> Self {
        Self {
            courses: defaults::courses_breaker(),
            blog: defaults::blog_breaker(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: debug, info, warn or error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Record format for the error logger
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            format: LogFormat::default(),
        }
    }
}

mod defaults {
    use super::BreakerConfig;

    pub fn base_url() -> String {
        "http://localhost:3000".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("abroad-data/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        1000
    }
    pub fn courses_breaker() -> BreakerConfig {
        BreakerConfig {
            max_failures: 5,
            timeout_ms: 60_000,
        }
    }
    pub fn blog_breaker() -> BreakerConfig {
        BreakerConfig {
            max_failures: 3,
            timeout_ms: 30_000,
        }
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
