//! # tickstage core
//!
//! Daily market-data ingestion for backtesting: downloads per-day raw
//! vendor files (order-book deltas and trades) and converts each day into a
//! combined canonical dataset plus an end-of-day order-book snapshot.
//!
//! ## Overview
//!
//! The pipeline runs with depth 1: while day N is being converted, the
//! download for day N+1 is already in flight. Every artifact is
//! write-once-if-absent and its presence on disk is the completion marker,
//! so re-running a range is cheap and idempotent.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Venue/stream identifiers, artifact keys, date ranges |
//! | [`layout`] | On-disk artifact layout under the data root |
//! | [`vendor`] | Vendor dataset endpoint and credential |
//! | [`http_client`] | HTTP transport abstraction (reqwest / no-op) |
//! | [`fetch`] | Raw fetch unit and day fetch coordinator |
//! | [`convert`] | Day conversion unit and converter collaborator boundary |
//! | [`retry`] | Fixed-delay retry policy for the conversion precondition |
//! | [`pipeline`] | Range pipeline driver |
//! | [`progress`] | Line-oriented progress observations |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickstage_core::{
//!     CommandConverter, ConsoleSink, DataLayout, DateRange, DayConverter, ExchangeId,
//!     InstrumentSpec, Pipeline, RawFetcher, ReqwestHttpClient, RetryPolicy, Symbol,
//!     VendorConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = DataLayout::new("data");
//!     let progress = Arc::new(ConsoleSink);
//!
//!     let fetcher = Arc::new(RawFetcher::new(
//!         Arc::new(ReqwestHttpClient::new()),
//!         VendorConfig::from_env(),
//!         layout.clone(),
//!         progress.clone(),
//!     ));
//!     let converter = DayConverter::new(
//!         layout,
//!         Arc::new(CommandConverter::from_env()),
//!         RetryPolicy::default(),
//!         progress,
//!     );
//!
//!     Pipeline::new(fetcher, converter)
//!         .run(
//!             ExchangeId::BinanceFutures,
//!             Symbol::parse("SOLUSDT")?,
//!             DateRange::parse("20240101", "20240102")?,
//!             InstrumentSpec::new(0.01, 0.1)?,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! A vendor denial (non-success HTTP status) is logged and swallowed; the
//! conversion unit's bounded missing-input retry is the only escalation
//! channel for it. Exhausting that retry budget is fatal and terminates the
//! whole range. Transport and filesystem failures propagate immediately.
//!
//! ## Concurrency
//!
//! Single-threaded cooperative scheduling is assumed (the CLI pins a
//! current-thread runtime). The conversion retry wait stalls the runtime
//! thread, so an in-flight fetch makes no progress during it.

pub mod convert;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod layout;
pub mod pipeline;
pub mod progress;
pub mod retry;
pub mod vendor;

// Re-export commonly used types at crate root for convenience

pub use convert::{
    CombineRequest, CommandConverter, ConvertError, DatasetConverter, DayConverter, NoopConverter,
    SnapshotRequest, COMBINE_BUFFER_SIZE,
};
pub use domain::{
    format_compact_date, parse_compact_date, DateRange, DayKey, Days, ExchangeId, FetchKey,
    InstrumentSpec, StreamKind, Symbol,
};
pub use error::ValidationError;
pub use fetch::{FetchError, FetchOutcome, RawFetcher};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use layout::DataLayout;
pub use pipeline::{Pipeline, PipelineError};
pub use progress::{ConsoleSink, NullSink, PipelineEvent, ProgressSink};
pub use retry::RetryPolicy;
pub use vendor::{VendorConfig, DEFAULT_BASE_URL};
