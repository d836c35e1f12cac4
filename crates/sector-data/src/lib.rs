//! Sector ETF market data and search-interest trends
//!
//! This crate fetches normalized data for the eleven SPDR Select Sector ETFs:
//!
//! - Two-session market snapshots (close price, market capitalization, volume)
//!   from Yahoo Finance
//! - Keyword suggestions for each sector's industry term from Google Trends
//! - Interest-over-time series for any keyword from Google Trends
//!
//! Every upstream call goes through a retry engine that backs off
//! exponentially on rate limits and gives up at once on anything else.
//!
//! # Architecture
//!
//! - [`registry`]: the fixed ticker to sector-name table
//! - [`retry`]: the retry/backoff engine
//! - [`api`]: provider traits and the Yahoo / Google implementations
//! - [`fetchers`]: retry + provider + normalization per data kind
//! - [`service`]: the facade that validates tickers and collapses failures
//!
//! # Example
//!
//! ```rust,ignore
//! use sector_data::{SectorConfig, SectorDataService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SectorConfig::from_env()?;
//!     let service = SectorDataService::new(&config);
//!
//!     let snapshot = service.market_snapshot("XLK").await?;
//!     println!("{}", serde_json::to_string_pretty(&snapshot)?);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod models;
pub mod normalize;
pub mod registry;
pub mod retry;
pub mod service;
pub mod timeframe;

// Re-export main types for convenience
pub use config::SectorConfig;
pub use error::{ProviderError, Result, SectorError, ServiceError, ServiceResult};
pub use fetchers::{MarketDataFetcher, TrendsFetcher};
pub use models::{
    InterestSeriesResult, KeywordSuggestion, MarketSnapshot, MetricComparison, TrendPoint,
    TrendsSuggestionResult,
};
pub use registry::{Sector, SectorTicker};
pub use retry::{Outcome, RetryError, RetryPolicy};
pub use service::SectorDataService;
pub use timeframe::Timeframe;
