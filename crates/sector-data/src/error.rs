//! Error types for sector data operations
//!
//! Three layers, innermost first:
//! - [`ProviderError`]: what an upstream provider reports
//! - [`SectorError`]: what a fetcher produces after retries and normalization
//! - [`ServiceError`]: what crosses the service boundary

use thiserror::Error;

/// Errors reported by an upstream data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream signalled throttling (HTTP 429 or equivalent)
    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Non-success HTTP status other than throttling
    #[error("{provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },

    /// Response arrived but did not have the expected shape
    #[error("Malformed {provider} response: {reason}")]
    Malformed { provider: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Endpoint could not be built
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl ProviderError {
    /// Whether this error is the distinguished rate-limit signal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors produced by the fetchers
#[derive(Debug, Error)]
pub enum SectorError {
    /// Caller input rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single attempt was throttled
    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Every attempt in the retry budget was throttled
    #[error("Rate limit persisted after {attempts} attempts: {reason}")]
    RateLimitExhausted { attempts: u32, reason: String },

    /// Non-retryable upstream failure
    #[error("Upstream failure: {0}")]
    UpstreamFatal(String),

    /// Upstream answered but lacked required fields or history
    #[error("Data not available for {subject}: {reason}")]
    InsufficientData { subject: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SectorError {
    pub(crate) fn insufficient(subject: &str, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            subject: subject.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ProviderError> for SectorError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { provider } => Self::RateLimited { provider },
            other => Self::UpstreamFatal(other.to_string()),
        }
    }
}

/// Result type alias for sector data operations
pub type Result<T> = std::result::Result<T, SectorError>;

/// Errors visible at the service boundary
///
/// Every data-fetch problem collapses to [`ServiceError::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Ticker is not one of the registered sector ETFs
    #[error("Ticker '{ticker}' not recognized as a sectoral ETF. Supported: {}", .supported.join(", "))]
    UnknownTicker {
        ticker: String,
        supported: Vec<String>,
    },

    /// Upstream data could not be produced
    #[error("{0}")]
    Unavailable(String),

    /// Something failed outside the anticipated failure paths
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this is the generic "unavailable" signal
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type alias for service boundary calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
