//! Domain value types: venue and stream identifiers, artifact keys, date
//! ranges, and instrument parameters.

mod keys;
mod symbol;

pub use keys::{
    format_compact_date, parse_compact_date, DateRange, DayKey, Days, ExchangeId, FetchKey,
    InstrumentSpec, StreamKind,
};
pub use symbol::Symbol;
