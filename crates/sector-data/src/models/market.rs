//! Market snapshot types

use serde::{Deserialize, Serialize};

/// Same-unit values from two consecutive trading sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// Value for the most recent session
    pub current_value: f64,
    /// Value for the session before it
    pub previous_value: f64,
}

impl MetricComparison {
    pub fn new(current_value: f64, previous_value: f64) -> Self {
        Self {
            current_value,
            previous_value,
        }
    }
}

/// Price, capitalization and volume of a sector ETF, current vs. previous session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub sector: String,
    pub last_close_price: Option<MetricComparison>,
    pub market_cap: Option<MetricComparison>,
    pub volume: Option<MetricComparison>,
}
