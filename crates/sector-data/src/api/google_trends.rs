//! Google Trends API client
//!
//! Google prefixes its JSON bodies with an anti-hijacking guard such as
//! `)]}',`; everything before the first `{` is discarded before parsing.
//!
//! The API endpoints throttle clients that arrive without the `NID` cookie,
//! so `connect` first loads the Trends landing page to fill the session jar.

use super::{
    InterestQuery, InterestRow, InterestTable, RawSuggestion, TrendsClient, TrendsProvider,
    check_status, endpoint, http_client,
};
use crate::config::SectorConfig;
use crate::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "Google Trends";
const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Google Trends search-interest provider
#[derive(Debug, Clone)]
pub struct GoogleTrendsProvider {
    base_url: String,
    language: String,
    tz_offset: i32,
    timeout: Duration,
    user_agent: String,
}

impl GoogleTrendsProvider {
    /// Create a provider from configuration
    pub fn new(config: &SectorConfig) -> Self {
        Self {
            base_url: config.trends_base_url.clone(),
            language: config.trends_language.clone(),
            tz_offset: config.trends_tz_offset,
            timeout: config.request_timeout,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for GoogleTrendsProvider {
    fn default() -> Self {
        Self::new(&SectorConfig::default())
    }
}

/// Region code for the cookie request: the part of the language after `-`
fn cookie_geo(language: &str) -> &str {
    language
        .rsplit_once('-')
        .map_or(language, |(_, region)| region)
}

#[async_trait]
impl TrendsProvider for GoogleTrendsProvider {
    async fn connect(&self) -> ProviderResult<Arc<dyn TrendsClient>> {
        let client = http_client(self.timeout, &self.user_agent)?;

        let url = endpoint(&self.base_url, &["trends", ""])?;
        let response = client
            .get(url)
            .query(&[("geo", cookie_geo(&self.language))])
            .send()
            .await?;
        check_status(PROVIDER, response)?;
        debug!("Google Trends session ready");

        Ok(Arc::new(GoogleTrendsClient {
            client,
            base_url: self.base_url.clone(),
            language: self.language.clone(),
            tz_offset: self.tz_offset.to_string(),
        }))
    }
}

/// One Google Trends session
struct GoogleTrendsClient {
    client: Client,
    base_url: String,
    language: String,
    tz_offset: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteEnvelope {
    default: AutocompleteBody,
}

#[derive(Debug, Deserialize)]
struct AutocompleteBody {
    #[serde(default)]
    topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    mid: Option<String>,
    title: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ExploreEnvelope {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    token: Option<String>,
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineEnvelope {
    default: MultilineBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultilineBody {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<i64>,
    is_partial: Option<bool>,
}

/// Strip the guard prefix and parse the JSON body
fn parse_guarded<T: DeserializeOwned>(body: &str) -> ProviderResult<T> {
    let start = body
        .find('{')
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "response has no JSON object"))?;
    Ok(serde_json::from_str(&body[start..])?)
}

fn explore_request(query: &InterestQuery) -> Value {
    json!({
        "comparisonItem": [{
            "keyword": query.keyword,
            "time": query.timeframe.to_string(),
            "geo": query.geo,
        }],
        "category": query.category,
        "property": query.property,
    })
}

/// Convert timeline points to rows
///
/// Google only marks the still-accumulating row; the others are complete, so
/// a missing flag on a present row reads as `false`.
fn rows_from_timeline(points: Vec<TimelinePoint>) -> ProviderResult<Vec<InterestRow>> {
    let mut rows = Vec::with_capacity(points.len());
    for point in points {
        let seconds: i64 = point.time.parse().map_err(|_| {
            ProviderError::malformed(PROVIDER, format!("bad timestamp {:?}", point.time))
        })?;
        let date = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| {
                ProviderError::malformed(PROVIDER, format!("timestamp {seconds} out of range"))
            })?
            .date_naive();
        let value = point.value.first().copied().ok_or_else(|| {
            ProviderError::malformed(PROVIDER, format!("no value for {date}"))
        })?;

        rows.push(InterestRow {
            date,
            value,
            is_partial: Some(point.is_partial.unwrap_or(false)),
        });
    }
    Ok(rows)
}

impl GoogleTrendsClient {
    async fn get_guarded<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let url = endpoint(&self.base_url, path)?;
        let response = self
            .client
            .get(url)
            .query(&[("hl", self.language.as_str()), ("tz", self.tz_offset.as_str())])
            .query(params)
            .send()
            .await?;
        let body = check_status(PROVIDER, response)?.text().await?;
        parse_guarded(&body)
    }
}

#[async_trait]
impl TrendsClient for GoogleTrendsClient {
    async fn suggestions(&self, keyword: &str) -> ProviderResult<Vec<RawSuggestion>> {
        debug!("Fetching suggestions for {:?}", keyword);
        let envelope: AutocompleteEnvelope = self
            .get_guarded(&["trends", "api", "autocomplete", keyword], &[])
            .await?;

        Ok(envelope
            .default
            .topics
            .into_iter()
            .map(|topic| RawSuggestion {
                mid: topic.mid,
                title: topic.title,
                kind: topic.kind,
            })
            .collect())
    }

    async fn interest_over_time(&self, query: &InterestQuery) -> ProviderResult<InterestTable> {
        debug!(
            "Fetching interest over time for {:?} ({})",
            query.keyword, query.timeframe
        );

        let request = explore_request(query).to_string();
        let explore: ExploreEnvelope = self
            .get_guarded(&["trends", "api", "explore"], &[("req", request.as_str())])
            .await?;

        let widget = explore
            .widgets
            .into_iter()
            .find(|widget| widget.id == TIMESERIES_WIDGET)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no TIMESERIES widget"))?;
        let token = widget
            .token
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "TIMESERIES widget has no token"))?;
        let widget_request = widget
            .request
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "TIMESERIES widget has no request"))?
            .to_string();

        let multiline: MultilineEnvelope = self
            .get_guarded(
                &["trends", "api", "widgetdata", "multiline"],
                &[("req", widget_request.as_str()), ("token", token.as_str())],
            )
            .await?;

        Ok(InterestTable {
            rows: rows_from_timeline(multiline.default.timeline_data)?,
        })
    }
}
