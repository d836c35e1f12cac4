//! Search-interest result types

use serde::{Deserialize, Serialize};

/// One related search term and its upstream classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub title: String,
    /// Entity type, e.g. "Topic" or "Search term"
    #[serde(rename = "type")]
    pub kind: String,
}

/// Keyword suggestions for an industry term
///
/// An empty `suggestions` list is a successful answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendsSuggestionResult {
    pub industry_name: String,
    pub suggestions: Vec<KeywordSuggestion>,
}

/// Interest level on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Popularity relative to the peak of the series, 0-100
    pub interest_level: u32,
}

/// Interest-over-time series for one keyword, oldest point first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestSeriesResult {
    pub keyword: String,
    pub timeframe: String,
    #[serde(rename = "results")]
    pub points: Vec<TrendPoint>,
}

impl InterestSeriesResult {
    /// Result with no data points
    pub fn empty(keyword: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            timeframe: timeframe.into(),
            points: Vec::new(),
        }
    }
}
