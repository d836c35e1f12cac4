//! Yahoo Finance API client
//!
//! Yahoo only answers quote requests that carry a session cookie and the
//! matching crumb token. `connect` performs that handshake: it visits the
//! cookie host with a finance referer, then reads the crumb from
//! `/v1/test/getcrumb`. Every later request sends the cookie from the jar and
//! the crumb as a query parameter.

use super::{LiveQuote, QuoteClient, QuoteProvider, SessionBar, check_status, endpoint, http_client};
use crate::config::SectorConfig;
use crate::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "Yahoo Finance";
const FINANCE_REFERER: &str = "https://finance.yahoo.com/";
const MAX_CRUMB_LEN: usize = 100;

/// Yahoo Finance quote provider
#[derive(Debug, Clone)]
pub struct YahooQuoteProvider {
    base_url: String,
    cookie_url: String,
    history_range: String,
    timeout: Duration,
    user_agent: String,
}

impl YahooQuoteProvider {
    /// Create a provider from configuration
    pub fn new(config: &SectorConfig) -> Self {
        Self {
            base_url: config.yahoo_base_url.clone(),
            cookie_url: config.yahoo_cookie_url.clone(),
            history_range: config.history_range.clone(),
            timeout: config.request_timeout,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new(&SectorConfig::default())
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn connect(&self) -> ProviderResult<Arc<dyn QuoteClient>> {
        let client = http_client(self.timeout, &self.user_agent)?;

        // The cookie host sets the session cookie even on an error status
        let response = client
            .get(&self.cookie_url)
            .header(REFERER, FINANCE_REFERER)
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
        debug!("Session cookie request answered {}", response.status());

        let url = endpoint(&self.base_url, &["v1", "test", "getcrumb"])?;
        let response = client.get(url).header(REFERER, FINANCE_REFERER).send().await?;
        let crumb = parse_crumb(&check_status(PROVIDER, response)?.text().await?)?;
        debug!("Yahoo session ready");

        Ok(Arc::new(YahooQuoteClient {
            client,
            base_url: self.base_url.clone(),
            history_range: self.history_range.clone(),
            crumb,
        }))
    }
}

/// Validate a `getcrumb` body
///
/// A throttled or logged-out session gets an HTML page or a plain-text
/// notice with a success status instead of a token.
fn parse_crumb(body: &str) -> ProviderResult<String> {
    let crumb = body.trim();
    if crumb.to_lowercase().contains("too many requests") {
        return Err(ProviderError::RateLimited {
            provider: PROVIDER.to_string(),
        });
    }
    if crumb.is_empty()
        || crumb.len() >= MAX_CRUMB_LEN
        || crumb.contains(char::is_whitespace)
        || crumb.contains('<')
    {
        return Err(ProviderError::malformed(PROVIDER, "no usable crumb in session response"));
    }
    Ok(crumb.to_string())
}

/// One authenticated Yahoo Finance session
struct YahooQuoteClient {
    client: Client,
    base_url: String,
    history_range: String,
    crumb: String,
}

impl YahooQuoteClient {
    fn get(&self, url: url::Url) -> RequestBuilder {
        self.client
            .get(url)
            .header(REFERER, FINANCE_REFERER)
            .query(&[("crumb", self.crumb.as_str())])
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooErrorBody {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteResult>,
    error: Option<YahooErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    regular_market_price: Option<f64>,
    market_cap: Option<f64>,
    regular_market_volume: Option<f64>,
    average_daily_volume3_month: Option<f64>,
}

impl YahooErrorBody {
    fn into_error(self) -> ProviderError {
        ProviderError::malformed(
            PROVIDER,
            format!(
                "{}: {}",
                self.code.as_deref().unwrap_or("error"),
                self.description.as_deref().unwrap_or("no description")
            ),
        )
    }
}

/// Pair closes with volumes, skipping sessions without a close
fn sessions_from_chart(result: ChartResult) -> Vec<SessionBar> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let rows = quote.close.len().max(result.timestamp.len());

    (0..rows)
        .filter_map(|i| {
            let close = quote.close.get(i).copied().flatten()?;
            let volume = quote.volume.get(i).copied().flatten();
            Some(SessionBar { close, volume })
        })
        .collect()
}

#[async_trait]
impl QuoteClient for YahooQuoteClient {
    async fn session_history(&self, ticker: &str) -> ProviderResult<Vec<SessionBar>> {
        let url = endpoint(&self.base_url, &["v8", "finance", "chart", ticker])?;
        debug!("Fetching {} session history for {}", self.history_range, ticker);

        let response = self
            .get(url)
            .query(&[("range", self.history_range.as_str()), ("interval", "1d")])
            .send()
            .await?;
        let envelope: ChartEnvelope = check_status(PROVIDER, response)?.json().await?;

        if let Some(error) = envelope.chart.error {
            return Err(error.into_error());
        }

        let result = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "chart has no result"))?;

        Ok(sessions_from_chart(result))
    }

    async fn live_quote(&self, ticker: &str) -> ProviderResult<LiveQuote> {
        let url = endpoint(&self.base_url, &["v7", "finance", "quote"])?;
        debug!("Fetching live quote for {}", ticker);

        let response = self.get(url).query(&[("symbols", ticker)]).send().await?;
        let envelope: QuoteEnvelope = check_status(PROVIDER, response)?.json().await?;

        if let Some(error) = envelope.quote_response.error {
            return Err(error.into_error());
        }

        let quote = envelope
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, format!("no quote for {ticker}")))?;

        Ok(LiveQuote {
            price: quote.regular_market_price,
            market_cap: quote.market_cap,
            volume: quote.regular_market_volume,
            average_volume: quote.average_daily_volume3_month,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{Recorded, Reply, TestServer};
    use serde_json::json;

    #[test]
    fn test_sessions_skip_missing_closes() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "chart": {
                "result": [{
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{
                        "close": [101.5, null, 103.25],
                        "volume": [1000, 2000, null]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap();

        let result = envelope.chart.result.unwrap().into_iter().next().unwrap();
        let sessions = sessions_from_chart(result);
        assert_eq!(
            sessions,
            vec![
                SessionBar {
                    close: 101.5,
                    volume: Some(1000.0)
                },
                SessionBar {
                    close: 103.25,
                    volume: None
                },
            ]
        );
    }

    #[test]
    fn test_quote_fields_deserialize() {
        let envelope: QuoteEnvelope = serde_json::from_value(json!({
            "quoteResponse": {
                "result": [{
                    "symbol": "XLK",
                    "regularMarketPrice": 210.1,
                    "marketCap": 70_000_000_000_u64,
                    "regularMarketVolume": 5_000_000,
                    "averageDailyVolume3Month": 6_500_000
                }],
                "error": null
            }
        }))
        .unwrap();

        let quote = &envelope.quote_response.result[0];
        assert_eq!(quote.regular_market_price, Some(210.1));
        assert_eq!(quote.market_cap, Some(70_000_000_000.0));
        assert_eq!(quote.average_daily_volume3_month, Some(6_500_000.0));
    }

    #[test]
    fn test_parse_crumb() {
        assert_eq!(parse_crumb("aB3.dE4/fG5\n").unwrap(), "aB3.dE4/fG5");

        let oversized = "x".repeat(MAX_CRUMB_LEN);
        for body in [
            "",
            "<html><body>Sign in</body></html>",
            "not a crumb",
            oversized.as_str(),
        ] {
            assert!(
                matches!(parse_crumb(body), Err(ProviderError::Malformed { .. })),
                "accepted {body:?}"
            );
        }
        assert!(parse_crumb("Too Many Requests\r\n").unwrap_err().is_rate_limited());
    }

    fn yahoo_reply(request: &Recorded) -> Reply {
        let authenticated = request.has_cookie("A3");
        match request.path.as_str() {
            "/cookie" => Reply::new(404, "").with_cookie("A3=d=AQABBK8"),
            "/v1/test/getcrumb" if authenticated => Reply::ok("aB3.dE4/fG5"),
            "/v7/finance/quote"
                if authenticated && request.query.get("crumb").map(String::as_str) == Some("aB3.dE4/fG5") =>
            {
                Reply::ok(
                    json!({"quoteResponse": {"result": [{
                        "symbol": "XLK",
                        "regularMarketPrice": 210.1,
                        "marketCap": 70_000_000_000_u64
                    }], "error": null}})
                    .to_string(),
                )
            }
            _ => Reply::new(401, r#"{"finance":{"error":{"code":"Unauthorized"}}}"#),
        }
    }

    fn provider_for(server: &TestServer) -> YahooQuoteProvider {
        let config = SectorConfig::builder()
            .yahoo_base_url(server.base_url.as_str())
            .yahoo_cookie_url(format!("{}/cookie", server.base_url))
            .build()
            .unwrap();
        YahooQuoteProvider::new(&config)
    }

    #[tokio::test]
    async fn test_session_sends_cookie_and_crumb() {
        let server = TestServer::start(yahoo_reply).await;

        let client = provider_for(&server).connect().await.unwrap();
        let quote = client.live_quote("XLK").await.unwrap();
        assert_eq!(quote.price, Some(210.1));
        assert_eq!(quote.market_cap, Some(70_000_000_000.0));

        let paths: Vec<_> = server.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, ["/cookie", "/v1/test/getcrumb", "/v7/finance/quote"]);

        let quote_requests = server.requests_to("/v7/finance/quote");
        assert_eq!(quote_requests[0].query["symbols"], "XLK");
        assert_eq!(quote_requests[0].header("referer"), Some(FINANCE_REFERER));
    }

    #[tokio::test]
    async fn test_each_connect_runs_its_own_handshake() {
        let server = TestServer::start(yahoo_reply).await;
        let provider = provider_for(&server);

        provider.connect().await.unwrap();
        provider.connect().await.unwrap();

        assert_eq!(server.requests_to("/cookie").len(), 2);
        assert_eq!(server.requests_to("/v1/test/getcrumb").len(), 2);
        // A fresh jar on each session: the cookie host sees no cookie
        assert!(server.requests_to("/cookie").iter().all(|r| !r.has_cookie("A3")));
    }

    #[tokio::test]
    async fn test_throttled_crumb_is_rate_limited() {
        let server = TestServer::start(|request: &Recorded| match request.path.as_str() {
            "/cookie" => Reply::ok("").with_cookie("A3=d=AQABBK8"),
            _ => Reply::new(429, "Too Many Requests"),
        })
        .await;

        let result = provider_for(&server).connect().await;
        assert!(result.is_err_and(|e| e.is_rate_limited()));
    }

    #[tokio::test]
    async fn test_missing_cookie_fails_session() {
        let server = TestServer::start(|request: &Recorded| match request.path.as_str() {
            "/cookie" => Reply::new(404, ""),
            _ => yahoo_reply(request),
        })
        .await;

        let result = provider_for(&server).connect().await;
        assert!(matches!(result, Err(ProviderError::Status { status: 401, .. })));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_session_history() {
        let client = YahooQuoteProvider::default().connect().await.unwrap();
        let sessions = client.session_history("XLK").await.unwrap();
        assert!(sessions.len() >= 2);
        assert!(sessions.iter().all(|s| s.close > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_quote() {
        let client = YahooQuoteProvider::default().connect().await.unwrap();
        let quote = client.live_quote("XLK").await.unwrap();
        assert!(quote.price.is_some());
    }
}
