//! Normalized result types returned to callers

pub mod market;
pub mod trends;

pub use market::{MarketSnapshot, MetricComparison};
pub use trends::{InterestSeriesResult, KeywordSuggestion, TrendPoint, TrendsSuggestionResult};
