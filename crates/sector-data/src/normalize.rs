//! Normalization of raw provider payloads into the fixed result schema
//!
//! Missing-data policy:
//! - fewer than two sessions, or no live price or capitalization: the whole
//!   snapshot is unavailable
//! - no live volume, or nothing to compare it against: `volume` is omitted
//! - no suggestions: an empty list, not a failure
//! - empty interest table, or one without the completeness column: an
//!   empty series, not a failure

use crate::api::{InterestTable, LiveQuote, RawSuggestion, SessionBar};
use crate::error::{Result, SectorError};
use crate::models::{
    InterestSeriesResult, KeywordSuggestion, MarketSnapshot, MetricComparison, TrendPoint,
    TrendsSuggestionResult,
};
use crate::timeframe::Timeframe;
use tracing::warn;

/// Decimal places kept for prices
pub const PRICE_DECIMALS: i32 = 3;

/// Round to a number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Capitalization one session back, scaled by the price move
///
/// Only the current capitalization is published upstream. A zero current
/// price yields zero.
pub fn derive_previous_market_cap(
    current_market_cap: f64,
    current_price: f64,
    previous_price: f64,
) -> f64 {
    if current_price == 0.0 {
        return 0.0;
    }
    (current_market_cap * previous_price / current_price).round()
}

/// Baseline to compare current volume against
///
/// Prefers the provider's average volume and falls back to the prior
/// session's volume. These are different statistics; both branches are kept
/// as published.
pub fn previous_volume(average_volume: Option<f64>, prior_session_volume: Option<f64>) -> Option<f64> {
    average_volume.or(prior_session_volume)
}

/// Build a snapshot from session history and live fields
pub fn market_snapshot(
    ticker: &str,
    sector: &str,
    sessions: &[SessionBar],
    live: &LiveQuote,
) -> Result<MarketSnapshot> {
    let [.., previous, current] = sessions else {
        return Err(SectorError::insufficient(
            ticker,
            format!("need 2 sessions, provider returned {}", sessions.len()),
        ));
    };

    if live.price.is_none() {
        return Err(SectorError::insufficient(ticker, "live price missing"));
    }
    let current_market_cap = live
        .market_cap
        .ok_or_else(|| SectorError::insufficient(ticker, "market capitalization missing"))?;

    let last_close_price = MetricComparison::new(
        round_to(current.close, PRICE_DECIMALS),
        round_to(previous.close, PRICE_DECIMALS),
    );

    let market_cap = MetricComparison::new(
        current_market_cap,
        derive_previous_market_cap(current_market_cap, current.close, previous.close),
    );

    let volume = live.volume.and_then(|current_volume| {
        previous_volume(live.average_volume, previous.volume)
            .map(|previous_volume| MetricComparison::new(current_volume, previous_volume))
    });

    Ok(MarketSnapshot {
        ticker: ticker.to_string(),
        sector: sector.to_string(),
        last_close_price: Some(last_close_price),
        market_cap: Some(market_cap),
        volume,
    })
}

/// Project raw suggestions to `{title, kind}`, keeping upstream order
pub fn suggestions(industry_name: &str, raw: Vec<RawSuggestion>) -> TrendsSuggestionResult {
    TrendsSuggestionResult {
        industry_name: industry_name.to_string(),
        suggestions: raw
            .into_iter()
            .map(|suggestion| KeywordSuggestion {
                title: suggestion.title,
                kind: suggestion.kind,
            })
            .collect(),
    }
}

/// Project an interest table to dated points, keeping upstream order
pub fn interest_series(
    keyword: &str,
    timeframe: &Timeframe,
    table: InterestTable,
) -> InterestSeriesResult {
    if table.rows.is_empty() || !table.has_partial_flag() {
        warn!(
            "Received empty or malformed interest table for {:?} ({}), returning no points",
            keyword, timeframe
        );
        return InterestSeriesResult::empty(keyword, timeframe.to_string());
    }

    InterestSeriesResult {
        keyword: keyword.to_string(),
        timeframe: timeframe.to_string(),
        points: table
            .rows
            .into_iter()
            .map(|row| TrendPoint {
                date: row.date.format("%Y-%m-%d").to_string(),
                interest_level: row.value.clamp(0, 100) as u32,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InterestRow;
    use chrono::NaiveDate;

    fn session(close: f64, volume: Option<f64>) -> SessionBar {
        SessionBar { close, volume }
    }

    fn live(price: Option<f64>, market_cap: Option<f64>) -> LiveQuote {
        LiveQuote {
            price,
            market_cap,
            volume: Some(5_000.0),
            average_volume: None,
        }
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(123.456_789, 3) - 123.457).abs() < 1e-9);
        assert!((round_to(0.0004, 3)).abs() < 1e-9);
    }

    #[test]
    fn test_previous_market_cap_derivation() {
        assert!((derive_previous_market_cap(1000.0, 100.0, 90.0) - 900.0).abs() < f64::EPSILON);
        // Rounded to a whole number
        assert!((derive_previous_market_cap(1000.0, 3.0, 1.0) - 333.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_previous_market_cap_zero_price_guard() {
        assert!(derive_previous_market_cap(1000.0, 0.0, 90.0).abs() < f64::EPSILON);
        assert!(derive_previous_market_cap(5e12, 0.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_previous_volume_prefers_average() {
        assert_eq!(previous_volume(Some(10.0), Some(20.0)), Some(10.0));
        assert_eq!(previous_volume(None, Some(20.0)), Some(20.0));
        assert_eq!(previous_volume(None, None), None);
    }

    #[test]
    fn test_snapshot_uses_two_latest_sessions() {
        let sessions = [
            session(80.0, Some(100.0)),
            session(90.123_44, Some(4_000.0)),
            session(100.0, Some(4_500.0)),
        ];
        let snapshot = market_snapshot("XLK", "Technology", &sessions, &live(Some(100.2), Some(1000.0)))
            .unwrap();

        assert_eq!(snapshot.ticker, "XLK");
        assert_eq!(snapshot.sector, "Technology");
        assert_eq!(
            snapshot.last_close_price,
            Some(MetricComparison::new(100.0, 90.123))
        );
        let cap = snapshot.market_cap.unwrap();
        assert!((cap.current_value - 1000.0).abs() < f64::EPSILON);
        assert!((cap.previous_value - 901.0).abs() < f64::EPSILON);
        // No average volume, so the prior session's volume is the baseline
        assert_eq!(snapshot.volume, Some(MetricComparison::new(5_000.0, 4_000.0)));
    }

    #[test]
    fn test_snapshot_requires_two_sessions() {
        for sessions in [vec![], vec![session(10.0, None)]] {
            let result = market_snapshot("XLE", "Energy", &sessions, &live(Some(10.0), Some(1.0)));
            assert!(matches!(result, Err(SectorError::InsufficientData { .. })));
        }
    }

    #[test]
    fn test_snapshot_requires_price_and_cap() {
        let sessions = [session(1.0, None), session(2.0, None)];
        assert!(market_snapshot("XLU", "Utilities", &sessions, &live(None, Some(1.0))).is_err());
        assert!(market_snapshot("XLU", "Utilities", &sessions, &live(Some(2.0), None)).is_err());
    }

    #[test]
    fn test_snapshot_omits_volume_without_baseline() {
        let sessions = [session(1.0, None), session(2.0, None)];
        let snapshot =
            market_snapshot("XLB", "Materials", &sessions, &live(Some(2.0), Some(10.0))).unwrap();
        assert!(snapshot.volume.is_none());
        assert!(snapshot.last_close_price.is_some());
    }

    #[test]
    fn test_suggestions_projection_keeps_order() {
        let raw = vec![
            RawSuggestion {
                mid: Some("/m/1".to_string()),
                title: "Solar power".to_string(),
                kind: "Topic".to_string(),
            },
            RawSuggestion {
                mid: None,
                title: "energy stocks".to_string(),
                kind: "Search term".to_string(),
            },
        ];

        let result = suggestions("Energy", raw);
        assert_eq!(result.industry_name, "Energy");
        let titles: Vec<_> = result.suggestions.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Solar power", "energy stocks"]);
        assert_eq!(result.suggestions[1].kind, "Search term");
    }

    #[test]
    fn test_interest_series_projection() {
        let timeframe = Timeframe::parse("2024-01-01", "2024-01-02").unwrap();
        let table = InterestTable {
            rows: vec![
                InterestRow {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    value: 50,
                    is_partial: Some(false),
                },
                InterestRow {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    value: 75,
                    is_partial: Some(true),
                },
            ],
        };

        let result = interest_series("solar", &timeframe, table);
        assert_eq!(result.timeframe, "2024-01-01 2024-01-02");
        assert_eq!(
            result.points,
            vec![
                TrendPoint {
                    date: "2024-01-01".to_string(),
                    interest_level: 50
                },
                TrendPoint {
                    date: "2024-01-02".to_string(),
                    interest_level: 75
                },
            ]
        );
    }

    #[test]
    fn test_interest_levels_clamped_to_index_range() {
        let timeframe = Timeframe::parse("2024-01-01", "2024-01-03").unwrap();
        let rows = [(1, 150), (2, -3), (3, 100)]
            .into_iter()
            .map(|(day, value)| InterestRow {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                value,
                is_partial: Some(false),
            })
            .collect();

        let result = interest_series("solar", &timeframe, InterestTable { rows });
        let levels: Vec<_> = result.points.iter().map(|p| p.interest_level).collect();
        assert_eq!(levels, vec![100, 0, 100]);
    }

    #[test]
    fn test_malformed_interest_table_is_empty_success() {
        let timeframe = Timeframe::parse("2024-01-01", "2024-01-31").unwrap();
        let unflagged = InterestTable {
            rows: vec![InterestRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: 12,
                is_partial: None,
            }],
        };

        let result = interest_series("solar", &timeframe, unflagged);
        assert_eq!(result, InterestSeriesResult::empty("solar", "2024-01-01 2024-01-31"));

        let empty = interest_series("solar", &timeframe, InterestTable::default());
        assert!(empty.points.is_empty());
        assert_eq!(empty.keyword, "solar");
    }
}
