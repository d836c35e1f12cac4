//! Upstream provider capabilities
//!
//! Each provider is a stateless factory: `connect` opens a fresh client
//! session, running whatever cookie handshake the upstream requires, and the
//! session performs the actual calls. Nothing is pooled or shared between
//! fetches.

pub mod google_trends;
#[cfg(test)]
pub(crate) mod test_server;
pub mod yahoo;

use crate::error::ProviderResult;
use crate::timeframe::Timeframe;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

pub use google_trends::GoogleTrendsProvider;
pub use yahoo::YahooQuoteProvider;

/// One trading session from the quote history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionBar {
    pub close: f64,
    pub volume: Option<f64>,
}

/// Live quote fields; any of them may be missing upstream
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveQuote {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub average_volume: Option<f64>,
}

/// Builds quote client sessions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Open a new client session
    async fn connect(&self) -> ProviderResult<Arc<dyn QuoteClient>>;
}

/// A quote provider session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Recent sessions, oldest first
    async fn session_history(&self, ticker: &str) -> ProviderResult<Vec<SessionBar>>;

    /// Live quote fields
    async fn live_quote(&self, ticker: &str) -> ProviderResult<LiveQuote>;
}

/// A suggestion as the search-interest provider reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSuggestion {
    /// Provider entity id, dropped during normalization
    pub mid: Option<String>,
    pub title: String,
    pub kind: String,
}

/// Parameters of an interest-over-time query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestQuery {
    pub keyword: String,
    pub timeframe: Timeframe,
    /// 0 means all categories
    pub category: u32,
    /// Empty means worldwide
    pub geo: String,
    /// Empty means web search
    pub property: String,
}

impl InterestQuery {
    /// Single keyword, all categories, worldwide, web search
    pub fn single_keyword(keyword: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            keyword: keyword.into(),
            timeframe,
            category: 0,
            geo: String::new(),
            property: String::new(),
        }
    }
}

/// One row of an interest-over-time table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRow {
    pub date: NaiveDate,
    pub value: i64,
    /// Completeness flag; `None` when the provider did not report one
    pub is_partial: Option<bool>,
}

/// Interest-over-time table, oldest row first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestTable {
    pub rows: Vec<InterestRow>,
}

impl InterestTable {
    /// Whether the per-row completeness column is present at all
    pub fn has_partial_flag(&self) -> bool {
        self.rows.iter().any(|row| row.is_partial.is_some())
    }
}

/// Builds search-interest client sessions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendsProvider: Send + Sync {
    /// Open a new client session
    async fn connect(&self) -> ProviderResult<Arc<dyn TrendsClient>>;
}

/// A search-interest provider session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendsClient: Send + Sync {
    /// Ranked related terms for a keyword
    async fn suggestions(&self, keyword: &str) -> ProviderResult<Vec<RawSuggestion>>;

    /// Interest-over-time table for a query
    async fn interest_over_time(&self, query: &InterestQuery) -> ProviderResult<InterestTable>;
}

/// Map an HTTP response status to a provider error
pub(crate) fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(crate::error::ProviderError::RateLimited {
            provider: provider.to_string(),
        });
    }
    if !status.is_success() {
        return Err(crate::error::ProviderError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> ProviderResult<url::Url> {
    let mut url = url::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build a reqwest client for one session
///
/// Each client owns its cookie jar, so session cookies never leak between
/// sessions.
pub(crate) fn http_client(
    timeout: std::time::Duration,
    user_agent: &str,
) -> ProviderResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .cookie_store(true)
        .build()?)
}
