//! Day conversion unit and the converter collaborator boundary.
//!
//! The byte-level CSV-to-canonical encoding lives behind
//! [`DatasetConverter`]; this module only sequences it: check that both raw
//! streams have landed (retrying on a fixed-delay policy while they have
//! not), then run the combine and snapshot steps, each skipped independently
//! when its output already exists.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{format_compact_date, DayKey, InstrumentSpec, StreamKind};
use crate::layout::DataLayout;
use crate::progress::{PipelineEvent, ProgressSink};
use crate::retry::RetryPolicy;

/// Internal buffer size handed to the combine step, as the vendor tooling
/// recommends. A pass-through performance hint, not a tunable.
pub const COMBINE_BUFFER_SIZE: usize = 200_000_000;

const CONVERTER_ENV: &str = "TICKSTAGE_CONVERTER";
const DEFAULT_CONVERTER: &str = "hftbacktest-convert";

/// Inputs for the combine step: both raw streams in, one combined dataset
/// out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineRequest {
    pub trades: PathBuf,
    pub book_deltas: PathBuf,
    pub output: PathBuf,
    pub buffer_size: usize,
}

/// Inputs for the snapshot step: combined dataset in, end-of-day order-book
/// state out.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
    pub combined: PathBuf,
    pub output: PathBuf,
    pub tick_size: f64,
    pub lot_size: f64,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("inputs for {date} still missing after {attempts} attempts: {reason}")]
    MissingInputs {
        date: String,
        attempts: u32,
        reason: String,
    },

    #[error("converter failed: {0}")]
    Converter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Converter collaborator contract.
///
/// Implementations own the actual byte-level conversion; the pipeline only
/// decides when to invoke each step and with which artifacts.
pub trait DatasetConverter: Send + Sync {
    fn combine<'a>(
        &'a self,
        request: CombineRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>>;

    fn snapshot<'a>(
        &'a self,
        request: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>>;
}

/// Offline converter for mock runs and tests.
///
/// Creates empty output files so the existence-based skip logic behaves
/// exactly as in production.
#[derive(Debug, Default)]
pub struct NoopConverter;

impl DatasetConverter for NoopConverter {
    fn combine<'a>(
        &'a self,
        request: CombineRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
        Box::pin(async move { touch(&request.output) })
    }

    fn snapshot<'a>(
        &'a self,
        request: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
        Box::pin(async move { touch(&request.output) })
    }
}

fn touch(path: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, [])?;
    Ok(())
}

/// Production adapter that shells out to an external converter executable.
///
/// Invocation protocol:
///
/// ```text
/// {program} combine  --output OUT --buffer-size N TRADES BOOK_DELTAS
/// {program} snapshot --output OUT --tick-size T --lot-size L COMBINED
/// ```
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program name from `TICKSTAGE_CONVERTER`, falling back to
    /// `hftbacktest-convert` on `PATH`.
    pub fn from_env() -> Self {
        let program =
            std::env::var(CONVERTER_ENV).unwrap_or_else(|_| String::from(DEFAULT_CONVERTER));
        Self::new(program)
    }

    async fn run(&self, mut command: tokio::process::Command) -> Result<(), ConvertError> {
        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(ConvertError::Io)?;

        if !output.status.success() {
            return Err(ConvertError::Converter(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl DatasetConverter for CommandConverter {
    fn combine<'a>(
        &'a self,
        request: CombineRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
        Box::pin(async move {
            let mut command = tokio::process::Command::new(&self.program);
            command
                .arg("combine")
                .arg("--output")
                .arg(&request.output)
                .arg("--buffer-size")
                .arg(request.buffer_size.to_string())
                .arg(&request.trades)
                .arg(&request.book_deltas);
            self.run(command).await
        })
    }

    fn snapshot<'a>(
        &'a self,
        request: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
        Box::pin(async move {
            let mut command = tokio::process::Command::new(&self.program);
            command
                .arg("snapshot")
                .arg("--output")
                .arg(&request.output)
                .arg("--tick-size")
                .arg(request.tick_size.to_string())
                .arg("--lot-size")
                .arg(request.lot_size.to_string())
                .arg(&request.combined);
            self.run(command).await
        })
    }
}

/// Day conversion unit: precondition retry plus the two idempotent steps.
pub struct DayConverter {
    layout: DataLayout,
    converter: Arc<dyn DatasetConverter>,
    policy: RetryPolicy,
    progress: Arc<dyn ProgressSink>,
}

impl DayConverter {
    pub fn new(
        layout: DataLayout,
        converter: Arc<dyn DatasetConverter>,
        policy: RetryPolicy,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            layout,
            converter,
            policy,
            progress,
        }
    }

    /// Convert one day into its combined dataset and end-of-day snapshot.
    ///
    /// Both raw streams must be on disk. While either is missing the attempt
    /// is retried on the fixed-delay policy; exhausting the policy is fatal.
    ///
    /// # Errors
    ///
    /// [`ConvertError::MissingInputs`] after the final failed attempt, or
    /// any failure from the converter collaborator.
    pub async fn convert_day(
        &self,
        day: &DayKey,
        instrument: InstrumentSpec,
    ) -> Result<(), ConvertError> {
        let trades = self.layout.raw(&day.fetch_key(StreamKind::Trades));
        let book_deltas = self.layout.raw(&day.fetch_key(StreamKind::BookDeltas));

        let mut attempt = 0;
        loop {
            attempt += 1;
            match missing_inputs(&trades, &book_deltas) {
                None => return self.run_steps(day, &trades, &book_deltas, instrument).await,
                Some(reason) => {
                    self.progress.emit(PipelineEvent::ConvertRetry {
                        date: day.date,
                        attempt,
                        reason: reason.clone(),
                    });
                    if self.policy.is_final(attempt) {
                        return Err(ConvertError::MissingInputs {
                            date: format_compact_date(day.date),
                            attempts: attempt,
                            reason,
                        });
                    }
                    stall_pipeline(self.policy.delay);
                }
            }
        }
    }

    async fn run_steps(
        &self,
        day: &DayKey,
        trades: &Path,
        book_deltas: &Path,
        instrument: InstrumentSpec,
    ) -> Result<(), ConvertError> {
        let combined = self.layout.combined(day);
        if combined.exists() {
            self.progress.emit(PipelineEvent::CombinedExists {
                path: combined.clone(),
            });
        } else {
            self.converter
                .combine(CombineRequest {
                    trades: trades.to_path_buf(),
                    book_deltas: book_deltas.to_path_buf(),
                    output: combined.clone(),
                    buffer_size: COMBINE_BUFFER_SIZE,
                })
                .await?;
            self.progress.emit(PipelineEvent::CombinedWritten {
                path: combined.clone(),
            });
        }

        let snapshot = self.layout.snapshot(day);
        if snapshot.exists() {
            self.progress
                .emit(PipelineEvent::SnapshotExists { path: snapshot });
        } else {
            self.converter
                .snapshot(SnapshotRequest {
                    combined,
                    output: snapshot.clone(),
                    tick_size: instrument.tick_size,
                    lot_size: instrument.lot_size,
                })
                .await?;
            self.progress
                .emit(PipelineEvent::SnapshotWritten { path: snapshot });
        }

        Ok(())
    }
}

fn missing_inputs(trades: &Path, book_deltas: &Path) -> Option<String> {
    let mut missing = Vec::new();
    if !trades.exists() {
        missing.push(trades.display().to_string());
    }
    if !book_deltas.exists() {
        missing.push(book_deltas.display().to_string());
    }
    if missing.is_empty() {
        None
    } else {
        Some(format!("missing input file(s): {}", missing.join(", ")))
    }
}

/// Pause between conversion attempts.
///
/// Sleeps the runtime thread itself: under the single-threaded scheduler no
/// other pipeline work, including an in-flight fetch, progresses during the
/// wait.
fn stall_pipeline(delay: Duration) {
    std::thread::sleep(delay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_compact_date, ExchangeId, Symbol};
    use crate::progress::NullSink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConverter {
        combines: AtomicUsize,
        snapshots: AtomicUsize,
    }

    impl CountingConverter {
        fn new() -> Self {
            Self {
                combines: AtomicUsize::new(0),
                snapshots: AtomicUsize::new(0),
            }
        }
    }

    impl DatasetConverter for CountingConverter {
        fn combine<'a>(
            &'a self,
            request: CombineRequest,
        ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
            self.combines.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { touch(&request.output) })
        }

        fn snapshot<'a>(
            &'a self,
            request: SnapshotRequest,
        ) -> Pin<Box<dyn Future<Output = Result<(), ConvertError>> + Send + 'a>> {
            self.snapshots.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { touch(&request.output) })
        }
    }

    fn day() -> DayKey {
        DayKey::new(
            ExchangeId::BinanceFutures,
            Symbol::parse("SOLUSDT").expect("valid"),
            parse_compact_date("20240101").expect("valid"),
        )
    }

    fn seed_raw(layout: &DataLayout, day: &DayKey) {
        for kind in [StreamKind::BookDeltas, StreamKind::Trades] {
            let path = layout.raw(&day.fetch_key(kind));
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            std::fs::write(path, b"raw").expect("seed");
        }
    }

    #[tokio::test]
    async fn conversion_produces_both_derived_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DataLayout::new(dir.path());
        let day = day();
        seed_raw(&layout, &day);

        let converter = Arc::new(CountingConverter::new());
        let unit = DayConverter::new(
            layout.clone(),
            Arc::clone(&converter) as Arc<dyn DatasetConverter>,
            RetryPolicy::new(5, Duration::ZERO),
            Arc::new(NullSink),
        );

        let instrument = InstrumentSpec::new(0.01, 0.1).expect("valid");
        unit.convert_day(&day, instrument).await.expect("convert");

        assert!(layout.combined(&day).exists());
        assert!(layout.snapshot(&day).exists());
        assert_eq!(converter.combines.load(Ordering::SeqCst), 1);
        assert_eq!(converter.snapshots.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn existing_outputs_skip_both_steps_independently() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DataLayout::new(dir.path());
        let day = day();
        seed_raw(&layout, &day);
        touch(&layout.combined(&day)).expect("seed combined");

        let converter = Arc::new(CountingConverter::new());
        let unit = DayConverter::new(
            layout.clone(),
            Arc::clone(&converter) as Arc<dyn DatasetConverter>,
            RetryPolicy::new(5, Duration::ZERO),
            Arc::new(NullSink),
        );

        let instrument = InstrumentSpec::new(0.01, 0.1).expect("valid");
        unit.convert_day(&day, instrument).await.expect("convert");

        // Combine was skipped, snapshot still ran.
        assert_eq!(converter.combines.load(Ordering::SeqCst), 0);
        assert_eq!(converter.snapshots.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_inputs_exhaust_the_policy_without_invoking_the_converter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DataLayout::new(dir.path());
        let day = day();

        let converter = Arc::new(CountingConverter::new());
        let unit = DayConverter::new(
            layout,
            Arc::clone(&converter) as Arc<dyn DatasetConverter>,
            RetryPolicy::new(3, Duration::from_millis(1)),
            Arc::new(NullSink),
        );

        let instrument = InstrumentSpec::new(0.01, 0.1).expect("valid");
        let error = unit
            .convert_day(&day, instrument)
            .await
            .expect_err("inputs never appear");

        match error {
            ConvertError::MissingInputs { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(converter.combines.load(Ordering::SeqCst), 0);
        assert_eq!(converter.snapshots.load(Ordering::SeqCst), 0);
    }
}
