//! Sector ETF registry
//!
//! Maps the SPDR Select Sector ETF tickers to the sector names used as
//! search terms. The table is fixed for the life of the process.

use crate::error::{ServiceError, ServiceResult};
use serde::Serialize;

/// One registered sector ETF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectorTicker {
    /// Uppercase ticker code, e.g. `XLK`
    pub code: &'static str,
    /// Human-readable sector name, e.g. `Technology`
    pub sector_name: &'static str,
}

/// Market sector definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sector {
    Technology,
    Finance,
    Energy,
    Healthcare,
    ConsumerDiscretionary,
    ConsumerStaples,
    Industrials,
    Materials,
    CommunicationServices,
    Utilities,
    RealEstate,
}

/// Every sector, in listing order
pub const ALL_SECTORS: [Sector; 11] = [
    Sector::Technology,
    Sector::Finance,
    Sector::Energy,
    Sector::Healthcare,
    Sector::ConsumerDiscretionary,
    Sector::ConsumerStaples,
    Sector::Industrials,
    Sector::Materials,
    Sector::CommunicationServices,
    Sector::Utilities,
    Sector::RealEstate,
];

impl Sector {
    /// Get sector ETF ticker (SPDR Select Sector ETFs)
    pub fn etf_ticker(&self) -> &'static str {
        match self {
            Sector::Technology => "XLK",
            Sector::Finance => "XLF",
            Sector::Energy => "XLE",
            Sector::Healthcare => "XLV",
            Sector::ConsumerDiscretionary => "XLY",
            Sector::ConsumerStaples => "XLP",
            Sector::Industrials => "XLI",
            Sector::Materials => "XLB",
            Sector::CommunicationServices => "XLC",
            Sector::Utilities => "XLU",
            Sector::RealEstate => "XLRE",
        }
    }

    /// Get sector name
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Finance => "Finance",
            Sector::Energy => "Energy",
            Sector::Healthcare => "Healthcare",
            Sector::ConsumerDiscretionary => "Consumer Discretionary",
            Sector::ConsumerStaples => "Consumer Staples",
            Sector::Industrials => "Industrials",
            Sector::Materials => "Materials",
            Sector::CommunicationServices => "Communication Services",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
        }
    }

    /// Registry entry for this sector
    pub fn ticker(&self) -> SectorTicker {
        SectorTicker {
            code: self.etf_ticker(),
            sector_name: self.name(),
        }
    }

    /// Resolve a ticker code, ignoring case and surrounding whitespace
    pub fn from_ticker(code: &str) -> Option<Self> {
        let code = code.trim();
        ALL_SECTORS
            .into_iter()
            .find(|sector| sector.etf_ticker().eq_ignore_ascii_case(code))
    }
}

/// All registry entries, in listing order
pub fn sector_tickers() -> Vec<SectorTicker> {
    ALL_SECTORS.iter().map(Sector::ticker).collect()
}

/// Supported ticker codes, in listing order
pub fn supported_codes() -> Vec<&'static str> {
    ALL_SECTORS.iter().map(Sector::etf_ticker).collect()
}

/// Look up a ticker code
pub fn lookup(code: &str) -> Option<SectorTicker> {
    Sector::from_ticker(code).map(|sector| sector.ticker())
}

/// Validate caller input, reporting every supported code on failure
pub fn validate(code: &str) -> ServiceResult<SectorTicker> {
    lookup(code).ok_or_else(|| ServiceError::UnknownTicker {
        ticker: code.trim().to_uppercase(),
        supported: supported_codes().into_iter().map(String::from).collect(),
    })
}

/// Sector name for a code, or a placeholder naming the unknown ticker
pub fn sector_name_or_unknown(code: &str) -> String {
    match lookup(code) {
        Some(entry) => entry.sector_name.to_string(),
        None => format!("Unknown Sector ({})", code.trim().to_uppercase()),
    }
}
