//! Configuration for sector data fetching

use crate::error::{Result, SectorError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_TRENDS_BASE_URL: &str = "https://trends.google.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Environment variable overriding [`SectorConfig::max_attempts`]
pub const ENV_MAX_ATTEMPTS: &str = "SECTOR_MAX_ATTEMPTS";
/// Environment variable overriding [`SectorConfig::retry_backoff_base`], in milliseconds
pub const ENV_BACKOFF_BASE_MS: &str = "SECTOR_BACKOFF_BASE_MS";
/// Environment variable overriding [`SectorConfig::request_timeout`], in seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SECTOR_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding [`SectorConfig::trends_language`]
pub const ENV_TRENDS_LANGUAGE: &str = "SECTOR_TRENDS_LANGUAGE";

/// Configuration for sector data operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Total attempts per fetch, first try included
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles for every later one
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Yahoo chart range used for session history
    pub history_range: String,

    /// Host language passed to Google Trends
    pub trends_language: String,

    /// Timezone offset in minutes passed to Google Trends
    pub trends_tz_offset: i32,

    /// Yahoo Finance API root
    pub yahoo_base_url: String,

    /// Page that hands out the Yahoo session cookie
    pub yahoo_cookie_url: String,

    /// Google Trends root
    pub trends_base_url: String,

    /// User agent sent to both providers
    pub user_agent: String,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            history_range: "5d".to_string(),
            trends_language: "en-US".to_string(),
            trends_tz_offset: 360,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            yahoo_cookie_url: DEFAULT_YAHOO_COOKIE_URL.to_string(),
            trends_base_url: DEFAULT_TRENDS_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SectorConfig {
    /// Create a new configuration builder
    pub fn builder() -> SectorConfigBuilder {
        SectorConfigBuilder::default()
    }

    /// Default configuration with `SECTOR_*` environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SectorError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.history_range.trim().is_empty() {
            return Err(SectorError::ConfigError(
                "history_range must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("yahoo_base_url", &self.yahoo_base_url),
            ("yahoo_cookie_url", &self.yahoo_cookie_url),
            ("trends_base_url", &self.trends_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| SectorError::ConfigError(format!("{name} is not a valid URL: {e}")))?;
        }

        Ok(())
    }
}

/// Builder for SectorConfig
#[derive(Debug, Default)]
pub struct SectorConfigBuilder {
    max_attempts: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    history_range: Option<String>,
    trends_language: Option<String>,
    trends_tz_offset: Option<i32>,
    yahoo_base_url: Option<String>,
    yahoo_cookie_url: Option<String>,
    trends_base_url: Option<String>,
    user_agent: Option<String>,
}

impl SectorConfigBuilder {
    /// Set total attempts per fetch
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the Yahoo chart range for session history
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set the Google Trends host language
    pub fn trends_language(mut self, language: impl Into<String>) -> Self {
        self.trends_language = Some(language.into());
        self
    }

    /// Set the Google Trends timezone offset
    pub fn trends_tz_offset(mut self, offset: i32) -> Self {
        self.trends_tz_offset = Some(offset);
        self
    }

    /// Point the quote provider at another host
    pub fn yahoo_base_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_base_url = Some(url.into());
        self
    }

    /// Set the page the Yahoo session cookie is read from
    pub fn yahoo_cookie_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_cookie_url = Some(url.into());
        self
    }

    /// Point the trends provider at another host
    pub fn trends_base_url(mut self, url: impl Into<String>) -> Self {
        self.trends_base_url = Some(url.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Apply `SECTOR_*` environment overrides
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(attempts) = env_parse::<u32>(ENV_MAX_ATTEMPTS)? {
            self.max_attempts = Some(attempts);
        }
        if let Some(millis) = env_parse::<u64>(ENV_BACKOFF_BASE_MS)? {
            self.retry_backoff_base = Some(Duration::from_millis(millis));
        }
        if let Some(secs) = env_parse::<u64>(ENV_REQUEST_TIMEOUT_SECS)? {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(language) = std::env::var(ENV_TRENDS_LANGUAGE) {
            self.trends_language = Some(language);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<SectorConfig> {
        let defaults = SectorConfig::default();

        let config = SectorConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            trends_language: self.trends_language.unwrap_or(defaults.trends_language),
            trends_tz_offset: self.trends_tz_offset.unwrap_or(defaults.trends_tz_offset),
            yahoo_base_url: self.yahoo_base_url.unwrap_or(defaults.yahoo_base_url),
            yahoo_cookie_url: self.yahoo_cookie_url.unwrap_or(defaults.yahoo_cookie_url),
            trends_base_url: self.trends_base_url.unwrap_or(defaults.trends_base_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SectorError::ConfigError(format!("{name}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(None),
    }
}
