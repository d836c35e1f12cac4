//! Service facade over the fetchers
//!
//! This is the surface a routing layer calls. Ticker codes are validated
//! against the registry before anything touches the network, every fetch
//! runs on its own task, and all data-fetch failures collapse to
//! [`ServiceError::Unavailable`].

use crate::api::{GoogleTrendsProvider, QuoteProvider, TrendsProvider, YahooQuoteProvider};
use crate::config::SectorConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::fetchers::{MarketDataFetcher, TrendsFetcher};
use crate::models::{InterestSeriesResult, MarketSnapshot, TrendsSuggestionResult};
use crate::registry::{self, SectorTicker};
use crate::retry::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use tracing::error;

/// Entry point for sector market data and search interest
#[derive(Clone)]
pub struct SectorDataService {
    market: MarketDataFetcher,
    trends: TrendsFetcher,
}

impl SectorDataService {
    /// Service backed by Yahoo Finance and Google Trends
    pub fn new(config: &SectorConfig) -> Self {
        Self::with_providers(
            Arc::new(YahooQuoteProvider::new(config)),
            Arc::new(GoogleTrendsProvider::new(config)),
            RetryPolicy::from_config(config),
        )
    }

    /// Service backed by arbitrary providers
    pub fn with_providers(
        quotes: Arc<dyn QuoteProvider>,
        trends: Arc<dyn TrendsProvider>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            market: MarketDataFetcher::new(quotes, policy.clone()),
            trends: TrendsFetcher::new(trends, policy),
        }
    }

    /// Registered sector ETFs, in listing order
    pub fn sectors(&self) -> Vec<SectorTicker> {
        registry::sector_tickers()
    }

    /// Two-session snapshot for a registered sector ETF
    pub async fn market_snapshot(&self, ticker_code: &str) -> ServiceResult<MarketSnapshot> {
        let entry = registry::validate(ticker_code)?;
        let fetcher = self.market.clone();

        let snapshot = run_isolated("market_snapshot", async move {
            fetcher.fetch_market_snapshot(entry.code).await
        })
        .await?;

        snapshot.ok_or_else(|| {
            ServiceError::Unavailable(format!(
                "Could not retrieve punctual data for '{}'. Invalid ticker or source service is down.",
                entry.code
            ))
        })
    }

    /// Keyword suggestions for the sector a ticker tracks
    pub async fn trends_suggestions(
        &self,
        ticker_code: &str,
    ) -> ServiceResult<TrendsSuggestionResult> {
        let entry = registry::validate(ticker_code)?;
        let fetcher = self.trends.clone();

        let result = run_isolated("trends_suggestions", async move {
            fetcher.fetch_suggestions(entry.sector_name).await
        })
        .await?;

        result.ok_or_else(|| {
            ServiceError::Unavailable(format!(
                "Could not retrieve trends data for '{}'. The service might be rate limiting or down.",
                entry.sector_name
            ))
        })
    }

    /// Interest-over-time series for a free-form keyword
    pub async fn interest_series(
        &self,
        keyword: &str,
        start_date: &str,
        end_date: &str,
    ) -> ServiceResult<InterestSeriesResult> {
        let fetcher = self.trends.clone();
        let (keyword, start_date, end_date) = (
            keyword.to_string(),
            start_date.to_string(),
            end_date.to_string(),
        );

        let result = run_isolated("interest_series", async move {
            fetcher
                .fetch_interest_series(&keyword, &start_date, &end_date)
                .await
        })
        .await?;

        result.ok_or_else(|| {
            ServiceError::Unavailable("Failed to retrieve time series data.".to_string())
        })
    }
}

/// Run a fetch on its own task so a panic surfaces as an internal error
async fn run_isolated<T, F>(operation: &str, fetch: F) -> ServiceResult<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fetch).await.map_err(|e| {
        error!("Unexpected failure in {}: {}", operation, e);
        ServiceError::Internal(format!("{operation} did not complete"))
    })
}
