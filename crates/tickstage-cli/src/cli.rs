//! CLI argument definitions for tickstage.
//!
//! One command: ingest a date range for a symbol. Dates are compact
//! `YYYYMMDD`; the range is inclusive and an inverted range is a valid
//! no-op.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--start-date` | required | First day of the range (YYYYMMDD) |
//! | `--end-date` | required | Last day of the range (YYYYMMDD) |
//! | `--symbol` | required | Instrument symbol |
//! | `--lot-size` | required | Instrument lot size |
//! | `--tick-size` | required | Instrument tick size |
//! | `--exchange` | `binance-futures` | Vendor venue |
//! | `--data-dir` | `data` | Artifact root directory |
//! | `--mock` | `false` | Offline no-op transport and converter |
//!
//! # Examples
//!
//! ```bash
//! tickstage --start-date 20240101 --end-date 20240102 \
//!     --symbol SOLUSDT --lot-size 0.1 --tick-size 0.01
//! ```

use clap::{Parser, ValueEnum};
use tickstage_core::ExchangeId;

/// Daily market-data ingestion pipeline.
///
/// Downloads per-day order-book deltas and trades from the vendor dataset
/// API and converts each day into a combined canonical dataset plus an
/// end-of-day order-book snapshot, overlapping the next day's download with
/// the current day's conversion.
#[derive(Debug, Parser)]
#[command(
    name = "tickstage",
    author,
    version,
    about = "Daily market-data ingestion for backtesting",
    long_about = "Tickstage ingests daily exchange market-data files for a symbol and date \
range:\n\
\n\
  • downloads both raw streams per day (order-book deltas, trades)\n\
  • converts each day into a combined dataset plus an end-of-day snapshot\n\
  • caches every artifact on disk and never re-does finished work\n\
\n\
The vendor credential is read from TARDIS_API_KEY; the external converter \
executable from TICKSTAGE_CONVERTER."
)]
pub struct Cli {
    /// First day of the range, YYYYMMDD.
    #[arg(long)]
    pub start_date: String,

    /// Last day of the range, YYYYMMDD (inclusive).
    ///
    /// A range that ends before it starts is valid and does nothing.
    #[arg(long)]
    pub end_date: String,

    /// Instrument symbol, e.g. SOLUSDT.
    #[arg(long)]
    pub symbol: String,

    /// Instrument lot size (strictly positive).
    #[arg(long)]
    pub lot_size: f64,

    /// Instrument tick size (strictly positive).
    #[arg(long)]
    pub tick_size: f64,

    /// Vendor venue to ingest from.
    #[arg(long, value_enum, default_value_t = ExchangeArg::BinanceFutures)]
    pub exchange: ExchangeArg,

    /// Root directory for raw and converted artifacts.
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Run offline: no-op transport and converter (empty outputs).
    #[arg(long, default_value_t = false)]
    pub mock: bool,
}

/// Vendor venue selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExchangeArg {
    BinanceFutures,
    Binance,
    Bybit,
    Deribit,
}

impl ExchangeArg {
    pub const fn to_exchange(self) -> ExchangeId {
        match self {
            Self::BinanceFutures => ExchangeId::BinanceFutures,
            Self::Binance => ExchangeId::Binance,
            Self::Bybit => ExchangeId::Bybit,
            Self::Deribit => ExchangeId::Deribit,
        }
    }
}
