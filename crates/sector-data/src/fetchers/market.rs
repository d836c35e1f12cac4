//! Market snapshot fetcher

use crate::api::QuoteProvider;
use crate::error::{ProviderError, Result, SectorError};
use crate::models::MarketSnapshot;
use crate::normalize;
use crate::registry;
use crate::retry::{Outcome, RetryPolicy};
use std::sync::Arc;
use tracing::{error, info};

/// Fetches two-session market snapshots for a ticker
#[derive(Clone)]
pub struct MarketDataFetcher {
    provider: Arc<dyn QuoteProvider>,
    policy: RetryPolicy,
}

impl MarketDataFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Fetch a snapshot, or `None` when it cannot be produced
    ///
    /// Failures are logged here and not surfaced further.
    pub async fn fetch_market_snapshot(&self, ticker_code: &str) -> Option<MarketSnapshot> {
        match self.try_fetch_market_snapshot(ticker_code).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("Market snapshot for {} failed: {}", ticker_code, e);
                None
            }
        }
    }

    /// Fetch a snapshot, reporting why it failed
    ///
    /// Every attempt opens a fresh provider session and repeats the whole
    /// sequence: session handshake, session history, live fields, derivation.
    /// Only rate limits are retried.
    pub async fn try_fetch_market_snapshot(&self, ticker_code: &str) -> Result<MarketSnapshot> {
        let ticker = ticker_code.trim().to_uppercase();
        let sector = registry::sector_name_or_unknown(&ticker);
        info!("Fetching market snapshot for {} ({})", ticker, sector);

        let provider = self.provider.as_ref();
        let ticker = ticker.as_str();
        let sector = sector.as_str();

        let snapshot = self
            .policy
            .execute("market_snapshot", move || attempt_snapshot(provider, ticker, sector))
            .await?;

        Ok(snapshot)
    }
}

async fn attempt_snapshot(
    provider: &dyn QuoteProvider,
    ticker: &str,
    sector: &str,
) -> Outcome<MarketSnapshot, SectorError> {
    let fetched = async {
        let client = provider.connect().await?;
        let sessions = client.session_history(ticker).await?;
        let live = client.live_quote(ticker).await?;
        Ok::<_, ProviderError>((sessions, live))
    }
    .await;

    match fetched {
        Ok((sessions, live)) => normalize::market_snapshot(ticker, sector, &sessions, &live).into(),
        Err(e) => Outcome::from_provider(Err(e)).map_err(Into::into),
    }
}
