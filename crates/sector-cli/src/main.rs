//! Command-line interface for sector-pulse
//!
//! # Usage
//!
//! ```bash
//! sector-pulse sectors
//! sector-pulse market XLK
//! sector-pulse trends xle
//! sector-pulse series "solar power" --start 2024-01-01 --end 2024-03-31
//! ```
//!
//! Results are printed as pretty JSON on stdout. Failures go to stderr with a
//! non-zero exit code.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sector_data::{SectorConfig, SectorDataService};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sector-pulse")]
#[command(about = "Sector ETF market snapshots and search-interest trends", long_about = None)]
struct Args {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported sector ETFs
    Sectors,

    /// Two-session market snapshot for a sector ETF
    Market {
        /// Ticker code, e.g. XLK
        ticker: String,
    },

    /// Search-term suggestions for the sector an ETF tracks
    Trends {
        /// Ticker code, e.g. XLE
        ticker: String,
    },

    /// Daily search interest for a keyword
    Series {
        /// Keyword to query
        keyword: String,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let app = sector_utils::Config::from_env();
    let filter = if args.verbose {
        "debug"
    } else {
        "warn,sector_data=info"
    };
    if app.is_production() {
        sector_utils::init_json_tracing_with(filter);
    } else {
        sector_utils::init_tracing_with(filter);
    }
    info!("Starting {} ({})", app.app_name, app.environment);

    let config = SectorConfig::from_env().context("invalid sector configuration")?;
    let service = SectorDataService::new(&config);

    let output = run(&service, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run(service: &SectorDataService, command: Command) -> anyhow::Result<Value> {
    let value = match command {
        Command::Sectors => serde_json::to_value(service.sectors())?,
        Command::Market { ticker } => serde_json::to_value(service.market_snapshot(&ticker).await?)?,
        Command::Trends { ticker } => {
            serde_json::to_value(service.trends_suggestions(&ticker).await?)?
        }
        Command::Series {
            keyword,
            start,
            end,
        } => serde_json::to_value(service.interest_series(&keyword, &start, &end).await?)?,
    };
    Ok(value)
}
