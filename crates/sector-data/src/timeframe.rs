//! Date range passed to interest-over-time queries

use crate::error::{Result, SectorError};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range, rendered upstream as `"YYYY-MM-DD YYYY-MM-DD"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    start: NaiveDate,
    end: NaiveDate,
}

impl Timeframe {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SectorError::InvalidInput(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date("start", start)?, parse_date("end", end)?)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_date(label: &str, raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    // chrono accepts unpadded fields; the upstream query does not
    let well_formed = raw.len() == 10
        && raw
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });

    if !well_formed {
        return Err(SectorError::InvalidInput(format!(
            "{label} date {raw:?} is not in YYYY-MM-DD format"
        )));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        SectorError::InvalidInput(format!("{label} date {raw:?} is not a calendar date: {e}"))
    })
}
