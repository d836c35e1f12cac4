//! Retry logic with exponential backoff
//!
//! Operations report an explicit [`Outcome`] for every attempt, so the policy
//! only ever looks at a declared classification and never at error identity.
//! Retryable outcomes are retried after `base * 2^attempt_index`; fatal ones
//! end the loop at once.

use crate::config::SectorConfig;
use crate::error::{ProviderError, ProviderResult, SectorError};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Classified result of a single attempt
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// Attempt produced a value
    Success(T),
    /// Attempt failed in a way worth trying again (rate limiting)
    Retryable(E),
    /// Attempt failed for good
    Fatal(E),
}

impl<T, E> Outcome<T, E> {
    /// Classify a plain result with a predicate deciding which errors are retryable
    pub fn classify(result: Result<T, E>, is_retryable: impl FnOnce(&E) -> bool) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if is_retryable(&err) => Self::Retryable(err),
            Err(err) => Self::Fatal(err),
        }
    }

    /// Convert the error side, keeping the classification
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Retryable(err) => Outcome::Retryable(f(err)),
            Self::Fatal(err) => Outcome::Fatal(f(err)),
        }
    }
}

impl<T> Outcome<T, ProviderError> {
    /// Rate-limit signals are retryable, everything else is fatal
    pub fn from_provider(result: ProviderResult<T>) -> Self {
        Self::classify(result, ProviderError::is_rate_limited)
    }
}

/// Errors are fatal unless classified otherwise
impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt was retryable and the budget ran out
    RateLimitExhausted { attempts: u32, last: E },
    /// An attempt failed fatally
    Fatal(E),
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimitExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} rate-limited attempts: {last}")
            }
            Self::Fatal(err) => write!(f, "{err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

impl From<RetryError<SectorError>> for SectorError {
    fn from(err: RetryError<SectorError>) -> Self {
        match err {
            RetryError::RateLimitExhausted { attempts, last } => SectorError::RateLimitExhausted {
                attempts,
                reason: last.to_string(),
            },
            RetryError::Fatal(err) => err,
        }
    }
}

impl From<RetryError<ProviderError>> for SectorError {
    fn from(err: RetryError<ProviderError>) -> Self {
        match err {
            RetryError::RateLimitExhausted { attempts, last } => SectorError::RateLimitExhausted {
                attempts,
                reason: last.to_string(),
            },
            RetryError::Fatal(err) => err.into(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,

    /// Delay after the first retryable failure
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// Policy matching a [`SectorConfig`]
    pub fn from_config(config: &SectorConfig) -> Self {
        Self::new(config.max_attempts, config.retry_backoff_base)
    }

    /// Delay inserted after the failure at `attempt_index` (0-based)
    pub fn backoff_duration(&self, attempt_index: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2_u32.saturating_pow(attempt_index))
    }

    /// Execute an async operation with retry logic
    ///
    /// # Arguments
    ///
    /// * `operation_name` - Name of the operation (for logging)
    /// * `operation` - Async operation to execute, reporting a classified [`Outcome`]
    ///
    /// # Returns
    ///
    /// The first successful value, the fatal error, or
    /// [`RetryError::RateLimitExhausted`] once every attempt was retryable
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            debug!(
                "Attempt {}/{} for operation: {}",
                attempt + 1,
                max_attempts,
                operation_name
            );

            match operation().await {
                Outcome::Success(value) => {
                    if attempt > 0 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name, attempt
                        );
                    }
                    return Ok(value);
                }
                Outcome::Fatal(err) => {
                    debug!(
                        "Operation '{}' failed with non-retryable error: {}",
                        operation_name, err
                    );
                    return Err(RetryError::Fatal(err));
                }
                Outcome::Retryable(err) => {
                    if attempt + 1 >= max_attempts {
                        warn!(
                            "Operation '{}' failed after {} attempts: {}",
                            operation_name, max_attempts, err
                        );
                        return Err(RetryError::RateLimitExhausted {
                            attempts: max_attempts,
                            last: err,
                        });
                    }

                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        "Operation '{}' rate limited (attempt {}/{}): {}. Retrying in {:?}",
                        operation_name,
                        attempt + 1,
                        max_attempts,
                        err,
                        backoff
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Execute an operation returning a plain `Result`, classifying its errors
    /// with `is_retryable`
    pub async fn execute_classified<F, Fut, T, E, C>(
        &self,
        operation_name: &str,
        mut operation: F,
        is_retryable: C,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: fmt::Display,
    {
        let is_retryable = &is_retryable;
        self.execute(operation_name, || {
            let attempt = operation();
            async move { Outcome::classify(attempt.await, is_retryable) }
        })
        .await
    }
}
