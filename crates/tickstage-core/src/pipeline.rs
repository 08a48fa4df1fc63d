//! Range pipeline driver.
//!
//! Iterates the requested date range in ascending order with pipeline depth
//! 1: while day N converts, the fetch for day N+1 is already in flight, and
//! nothing else overlaps. Conversions are strictly sequential across days;
//! a conversion that exhausts its retry budget terminates the whole run.

use std::sync::Arc;

use thiserror::Error;

use crate::convert::{ConvertError, DayConverter};
use crate::domain::{DateRange, DayKey, ExchangeId, InstrumentSpec, Symbol};
use crate::fetch::{FetchError, RawFetcher};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("fetch task aborted: {0}")]
    FetchTask(#[from] tokio::task::JoinError),
}

/// Drives fetch and conversion over an inclusive date range.
pub struct Pipeline {
    fetcher: Arc<RawFetcher>,
    converter: DayConverter,
}

impl Pipeline {
    pub fn new(fetcher: Arc<RawFetcher>, converter: DayConverter) -> Self {
        Self { fetcher, converter }
    }

    /// Process every day in `range`.
    ///
    /// For each day the fetch is started without waiting, the previous day's
    /// conversion is awaited, then the in-flight fetch is awaited before the
    /// next iteration reuses the slot. The final day's conversion is drained
    /// after the loop. An empty range completes immediately.
    ///
    /// # Errors
    ///
    /// The first fatal conversion or fetch transport failure halts the run;
    /// no later day is attempted.
    pub async fn run(
        &self,
        exchange: ExchangeId,
        symbol: Symbol,
        range: DateRange,
        instrument: InstrumentSpec,
    ) -> Result<(), PipelineError> {
        let mut previous: Option<DayKey> = None;

        for date in range.iter() {
            let day = DayKey::new(exchange, symbol.clone(), date);

            let fetcher = Arc::clone(&self.fetcher);
            let fetch_day = day.clone();
            let download = tokio::spawn(async move { fetcher.fetch_day(&fetch_day).await });

            if let Some(prev) = previous.take() {
                self.converter.convert_day(&prev, instrument).await?;
            }

            download.await??;
            previous = Some(day);
        }

        if let Some(last) = previous {
            self.converter.convert_day(&last, instrument).await?;
        }

        Ok(())
    }
}
