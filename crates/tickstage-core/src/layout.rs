//! On-disk artifact layout.
//!
//! Every artifact lives under `{root}/{exchange}/{symbol}/` and is
//! write-once-if-absent: presence of the file on disk is the completion
//! marker, there is no separate metadata store.
//!
//! | Artifact | File name |
//! |----------|-----------|
//! | Raw stream | `{stream-kind}_{yyyymmdd}.csv.gz` |
//! | Combined dataset | `combined_{yyyymmdd}.npz` |
//! | End-of-day snapshot | `eod_{yyyymmdd}.npz` |

use std::path::PathBuf;

use crate::domain::{format_compact_date, DayKey, ExchangeId, FetchKey, Symbol};

/// Resolves artifact keys to paths under a data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn day_dir(&self, exchange: ExchangeId, symbol: &Symbol) -> PathBuf {
        self.root.join(exchange.as_str()).join(symbol.as_str())
    }

    /// Path of one raw vendor stream file.
    pub fn raw(&self, key: &FetchKey) -> PathBuf {
        self.day_dir(key.exchange, &key.symbol).join(format!(
            "{}_{}.csv.gz",
            key.kind.as_str(),
            format_compact_date(key.date)
        ))
    }

    /// Path of the combined canonical dataset for one day.
    pub fn combined(&self, day: &DayKey) -> PathBuf {
        self.day_dir(day.exchange, &day.symbol)
            .join(format!("combined_{}.npz", format_compact_date(day.date)))
    }

    /// Path of the end-of-day order-book snapshot for one day.
    pub fn snapshot(&self, day: &DayKey) -> PathBuf {
        self.day_dir(day.exchange, &day.symbol)
            .join(format!("eod_{}.npz", format_compact_date(day.date)))
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_compact_date, StreamKind};

    fn day() -> DayKey {
        DayKey::new(
            ExchangeId::BinanceFutures,
            Symbol::parse("SOLUSDT").expect("valid"),
            parse_compact_date("20240101").expect("valid"),
        )
    }

    #[test]
    fn raw_path_encodes_stream_kind_and_date() {
        let layout = DataLayout::new("data");
        let path = layout.raw(&day().fetch_key(StreamKind::BookDeltas));
        assert_eq!(
            path,
            PathBuf::from("data/binance-futures/SOLUSDT/book-deltas_20240101.csv.gz")
        );
    }

    #[test]
    fn derived_artifact_paths_share_the_day_directory() {
        let layout = DataLayout::new("data");
        assert_eq!(
            layout.combined(&day()),
            PathBuf::from("data/binance-futures/SOLUSDT/combined_20240101.npz")
        );
        assert_eq!(
            layout.snapshot(&day()),
            PathBuf::from("data/binance-futures/SOLUSDT/eod_20240101.npz")
        );
    }
}
