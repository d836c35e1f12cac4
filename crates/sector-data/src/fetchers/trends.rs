//! Search-interest fetcher

use super::require_term;
use crate::api::{InterestQuery, TrendsClient, TrendsProvider};
use crate::error::{Result, SectorError};
use crate::models::{InterestSeriesResult, TrendsSuggestionResult};
use crate::normalize;
use crate::retry::{Outcome, RetryPolicy};
use crate::timeframe::Timeframe;
use std::sync::Arc;
use tracing::{error, info};

/// Fetches keyword suggestions and interest-over-time series
#[derive(Clone)]
pub struct TrendsFetcher {
    provider: Arc<dyn TrendsProvider>,
    policy: RetryPolicy,
}

impl TrendsFetcher {
    pub fn new(provider: Arc<dyn TrendsProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// One session serves every attempt of a fetch; failing to open it is fatal
    async fn open_session(&self) -> Result<Arc<dyn TrendsClient>> {
        self.provider
            .connect()
            .await
            .map_err(|e| SectorError::UpstreamFatal(format!("session bootstrap failed: {e}")))
    }

    /// Related search terms for an industry, or `None` on failure
    pub async fn fetch_suggestions(&self, industry_name: &str) -> Option<TrendsSuggestionResult> {
        self.try_fetch_suggestions(industry_name)
            .await
            .inspect_err(|e| error!("Trends suggestions for {:?} failed: {}", industry_name, e))
            .ok()
    }

    /// Related search terms for an industry
    ///
    /// An empty upstream list is a successful, empty result.
    pub async fn try_fetch_suggestions(&self, industry_name: &str) -> Result<TrendsSuggestionResult> {
        require_term("industry name", industry_name)?;
        info!("Fetching trends suggestions for {:?}", industry_name);

        let client = self.open_session().await?;
        let client = client.as_ref();

        let raw = self
            .policy
            .execute("trends_suggestions", move || async move {
                Outcome::from_provider(client.suggestions(industry_name).await)
            })
            .await?;

        Ok(normalize::suggestions(industry_name, raw))
    }

    /// Interest series for a keyword, or `None` on failure
    pub async fn fetch_interest_series(
        &self,
        keyword: &str,
        start_date: &str,
        end_date: &str,
    ) -> Option<InterestSeriesResult> {
        self.try_fetch_interest_series(keyword, start_date, end_date)
            .await
            .inspect_err(|e| error!("Interest series for {:?} failed: {}", keyword, e))
            .ok()
    }

    /// Interest series for a keyword between two `YYYY-MM-DD` dates
    ///
    /// Dates are validated before any network call. A response without
    /// rows or without the completeness column yields an empty series.
    pub async fn try_fetch_interest_series(
        &self,
        keyword: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<InterestSeriesResult> {
        require_term("keyword", keyword)?;
        let timeframe = Timeframe::parse(start_date, end_date)?;
        info!("Fetching interest series for {:?} ({})", keyword, timeframe);

        let query = InterestQuery::single_keyword(keyword, timeframe);
        let client = self.open_session().await?;
        let client = client.as_ref();
        let query = &query;

        let table = self
            .policy
            .execute("interest_series", move || async move {
                Outcome::from_provider(client.interest_over_time(query).await)
            })
            .await?;

        Ok(normalize::interest_series(keyword, &timeframe, table))
    }
}
