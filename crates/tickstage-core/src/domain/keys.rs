//! Identity keys for cached artifacts.
//!
//! A [`FetchKey`] names exactly one raw vendor file; a [`DayKey`] groups the
//! two raw streams that feed one day's conversion. Both are pure value types:
//! the artifact tree on disk is the only state keyed by them.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use super::Symbol;
use crate::ValidationError;

/// Vendor venue identifier. One venue per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExchangeId {
    BinanceFutures,
    Binance,
    Bybit,
    Deribit,
}

impl ExchangeId {
    /// Vendor spelling used in URLs and artifact paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BinanceFutures => "binance-futures",
            Self::Binance => "binance",
            Self::Bybit => "bybit",
            Self::Deribit => "deribit",
        }
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two per-day raw streams delivered by the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamKind {
    BookDeltas,
    Trades,
}

impl StreamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookDeltas => "book-deltas",
            Self::Trades => "trades",
        }
    }
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies exactly one raw artifact: (exchange, symbol, date, stream kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub exchange: ExchangeId,
    pub symbol: Symbol,
    pub date: Date,
    pub kind: StreamKind,
}

/// Groups the two raw streams needed to convert one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub exchange: ExchangeId,
    pub symbol: Symbol,
    pub date: Date,
}

impl DayKey {
    pub fn new(exchange: ExchangeId, symbol: Symbol, date: Date) -> Self {
        Self {
            exchange,
            symbol,
            date,
        }
    }

    pub fn fetch_key(&self, kind: StreamKind) -> FetchKey {
        FetchKey {
            exchange: self.exchange,
            symbol: self.symbol.clone(),
            date: self.date,
            kind,
        }
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.exchange,
            self.symbol,
            format_compact_date(self.date)
        )
    }
}

/// Parse a compact `YYYYMMDD` date.
pub fn parse_compact_date(input: &str) -> Result<Date, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        input: input.to_string(),
    };

    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = input[..4].parse().map_err(|_| invalid())?;
    let month: u8 = input[4..6].parse().map_err(|_| invalid())?;
    let day: u8 = input[6..8].parse().map_err(|_| invalid())?;

    let month = Month::try_from(month).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Format a date as compact `YYYYMMDD`.
pub fn format_compact_date(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

/// Inclusive daily date range. `end < start` is a valid empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub const fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Parse a range from two compact `YYYYMMDD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            start: parse_compact_date(start)?,
            end: parse_compact_date(end)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Days in ascending order. This iteration order is the sole source of
    /// the pipeline's ordering guarantees.
    pub fn iter(&self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Ascending iterator over the days of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<Date>,
    end: Date,
}

impl Iterator for Days {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next.take().filter(|date| *date <= self.end)?;
        self.next = current.next_day();
        Some(current)
    }
}

/// Per-symbol instrument precision parameters passed through to the
/// snapshot step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentSpec {
    pub tick_size: f64,
    pub lot_size: f64,
}

impl InstrumentSpec {
    pub fn new(tick_size: f64, lot_size: f64) -> Result<Self, ValidationError> {
        if !(tick_size.is_finite() && tick_size > 0.0) {
            return Err(ValidationError::NonPositive {
                name: "tick size",
                value: tick_size,
            });
        }
        if !(lot_size.is_finite() && lot_size > 0.0) {
            return Err(ValidationError::NonPositive {
                name: "lot size",
                value: lot_size,
            });
        }
        Ok(Self {
            tick_size,
            lot_size,
        })
    }
}
