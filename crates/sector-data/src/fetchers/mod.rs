//! Fetch components
//!
//! Each fetcher wraps one provider capability in the retry engine and the
//! normalizer. The `try_*` methods report why a fetch failed; the plain
//! methods log the failure and return `None`.

pub mod market;
pub mod trends;

pub use market::MarketDataFetcher;
pub use trends::TrendsFetcher;

use crate::error::{Result, SectorError};

/// Reject a blank caller-supplied term before any network call
///
/// Only the check trims; the term is sent and echoed exactly as given.
fn require_term(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SectorError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(())
}
