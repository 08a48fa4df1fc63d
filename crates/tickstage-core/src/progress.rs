//! Line-oriented progress observations.
//!
//! Every user-visible event the pipeline produces is a [`PipelineEvent`];
//! sinks decide where the lines go. The console rendering is the process's
//! only output channel besides the final error.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use time::Date;

use crate::domain::format_compact_date;

/// One observation emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Raw artifact already on disk; the fetch was skipped.
    RawExists { path: PathBuf },
    /// Raw artifact downloaded and written.
    RawDownloaded { path: PathBuf },
    /// Vendor returned a non-success status; the fetch was swallowed.
    RawDenied {
        path: PathBuf,
        status: u16,
        body: String,
    },
    /// A conversion attempt found its inputs missing.
    ConvertRetry {
        date: Date,
        attempt: u32,
        reason: String,
    },
    CombinedExists { path: PathBuf },
    CombinedWritten { path: PathBuf },
    SnapshotExists { path: PathBuf },
    SnapshotWritten { path: PathBuf },
}

impl Display for PipelineEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RawExists { path } => {
                write!(f, "File already exists: {}", path.display())
            }
            Self::RawDownloaded { path } => {
                write!(f, "Downloaded file: {}", path.display())
            }
            Self::RawDenied { path, status, body } => {
                write!(
                    f,
                    "Failed to download file: {}, status {status}: {body}",
                    path.display()
                )
            }
            Self::ConvertRetry {
                date,
                attempt,
                reason,
            } => {
                write!(
                    f,
                    "Attempt {attempt} for {}: {reason}",
                    format_compact_date(*date)
                )
            }
            Self::CombinedExists { path } => {
                write!(f, "Combined dataset already exists: {}", path.display())
            }
            Self::CombinedWritten { path } => {
                write!(f, "Combined dataset written: {}", path.display())
            }
            Self::SnapshotExists { path } => {
                write!(f, "End-of-day snapshot already exists: {}", path.display())
            }
            Self::SnapshotWritten { path } => {
                write!(f, "End-of-day snapshot written: {}", path.display())
            }
        }
    }
}

/// Destination for pipeline observations.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Prints each observation as one line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: PipelineEvent) {
        println!("{event}");
    }
}

/// Discards observations.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_compact_date;

    #[test]
    fn events_render_as_single_lines() {
        let path = PathBuf::from("data/binance-futures/SOLUSDT/trades_20240101.csv.gz");
        let date = parse_compact_date("20240101").expect("valid");

        let cases = [
            (
                PipelineEvent::RawExists { path: path.clone() },
                "File already exists: data/binance-futures/SOLUSDT/trades_20240101.csv.gz",
            ),
            (
                PipelineEvent::RawDownloaded { path: path.clone() },
                "Downloaded file: data/binance-futures/SOLUSDT/trades_20240101.csv.gz",
            ),
            (
                PipelineEvent::RawDenied {
                    path,
                    status: 403,
                    body: String::from("forbidden"),
                },
                "Failed to download file: data/binance-futures/SOLUSDT/trades_20240101.csv.gz, \
                 status 403: forbidden",
            ),
            (
                PipelineEvent::ConvertRetry {
                    date,
                    attempt: 2,
                    reason: String::from("missing input file"),
                },
                "Attempt 2 for 20240101: missing input file",
            ),
        ];

        for (event, expected) in cases {
            assert_eq!(event.to_string(), expected);
            assert!(!event.to_string().contains('\n'));
        }
    }
}
