//! Raw fetch unit and day fetch coordinator.
//!
//! One [`FetchKey`] maps to at most one artifact on disk; a fetch is skipped
//! outright when the artifact is present (content is never re-validated).
//! A vendor denial (non-success status) is reported through the progress
//! sink and swallowed: the conversion unit's missing-input retry is the only
//! escalation channel for it. Transport and filesystem failures do
//! propagate.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::{DayKey, FetchKey, StreamKind};
use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::layout::DataLayout;
use crate::progress::{PipelineEvent, ProgressSink};
use crate::vendor::VendorConfig;

/// Result of one raw fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Artifact already on disk; no request was made.
    Skipped,
    /// Artifact downloaded and written.
    Downloaded,
    /// Vendor returned a non-success status; nothing was written.
    Denied,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure for {url}: {source}")]
    Transport { url: String, source: HttpError },

    #[error("failed to write raw artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Downloads raw vendor streams, idempotently, one artifact per key.
#[derive(Clone)]
pub struct RawFetcher {
    http: Arc<dyn HttpClient>,
    vendor: VendorConfig,
    layout: DataLayout,
    progress: Arc<dyn ProgressSink>,
}

impl RawFetcher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        vendor: VendorConfig,
        layout: DataLayout,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            http,
            vendor,
            layout,
            progress,
        }
    }

    /// Fetch one raw stream.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only for transport or filesystem failures.
    /// A vendor denial yields `Ok(FetchOutcome::Denied)`.
    pub async fn fetch(&self, key: &FetchKey) -> Result<FetchOutcome, FetchError> {
        let path = self.layout.raw(key);
        if path.exists() {
            self.progress.emit(PipelineEvent::RawExists { path });
            return Ok(FetchOutcome::Skipped);
        }

        let url = self.vendor.dataset_url(key);
        let request = HttpRequest::get(&url).with_auth(&self.vendor.auth());
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| FetchError::Transport { url, source })?;

        if !response.is_success() {
            self.progress.emit(PipelineEvent::RawDenied {
                path,
                status: response.status,
                body: response.body_text().into_owned(),
            });
            return Ok(FetchOutcome::Denied);
        }

        write_atomic(&path, &response.body).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        self.progress.emit(PipelineEvent::RawDownloaded { path });
        Ok(FetchOutcome::Downloaded)
    }

    /// Day fetch coordinator: runs the book-deltas and trades fetches
    /// concurrently and completes once both have finished. Neither fetch is
    /// ever cancelled, and a denial in one is invisible here.
    pub async fn fetch_day(&self, day: &DayKey) -> Result<(), FetchError> {
        let deltas_key = day.fetch_key(StreamKind::BookDeltas);
        let trades_key = day.fetch_key(StreamKind::Trades);
        let deltas = self.fetch(&deltas_key);
        let trades = self.fetch(&trades_key);

        let (deltas, trades) = tokio::join!(deltas, trades);
        deltas?;
        trades?;
        Ok(())
    }
}

/// Write the full body to `path` via a temp file in the same directory,
/// creating parent directories as needed. The artifact is either absent or
/// complete, never partial.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_compact_date, ExchangeId, Symbol};
    use crate::http_client::HttpResponse;
    use crate::progress::NullSink;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticHttp {
        status: u16,
        body: &'static [u8],
        calls: AtomicUsize,
    }

    impl StaticHttp {
        fn new(status: u16, body: &'static [u8]) -> Self {
            Self {
                status,
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HttpClient for StaticHttp {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = HttpResponse {
                status: self.status,
                body: self.body.to_vec(),
            };
            Box::pin(async move { Ok(response) })
        }
    }

    fn key(root: &Path) -> (Arc<StaticHttp>, RawFetcher, FetchKey) {
        let http = Arc::new(StaticHttp::new(200, b"gzip-bytes"));
        let fetcher = RawFetcher::new(
            Arc::clone(&http) as Arc<dyn HttpClient>,
            VendorConfig::new("https://vendor.test/v1", "k"),
            DataLayout::new(root),
            Arc::new(NullSink),
        );
        let key = FetchKey {
            exchange: ExchangeId::BinanceFutures,
            symbol: Symbol::parse("SOLUSDT").expect("valid"),
            date: parse_compact_date("20240101").expect("valid"),
            kind: StreamKind::Trades,
        };
        (http, fetcher, key)
    }

    #[tokio::test]
    async fn successful_fetch_writes_the_body_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (http, fetcher, key) = key(dir.path());

        let outcome = fetcher.fetch(&key).await.expect("fetch");
        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);

        let written = std::fs::read(fetcher.layout.raw(&key)).expect("artifact");
        assert_eq!(written, b"gzip-bytes");
    }

    #[tokio::test]
    async fn existing_artifact_skips_the_network_entirely() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (http, fetcher, key) = key(dir.path());

        let path = fetcher.layout.raw(&key);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, b"original").expect("seed");

        let outcome = fetcher.fetch(&key).await.expect("fetch");
        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(&path).expect("artifact"), b"original");
    }

    #[tokio::test]
    async fn vendor_denial_is_swallowed_and_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let http = Arc::new(StaticHttp::new(403, b"forbidden"));
        let fetcher = RawFetcher::new(
            Arc::clone(&http) as Arc<dyn HttpClient>,
            VendorConfig::new("https://vendor.test/v1", "k"),
            DataLayout::new(dir.path()),
            Arc::new(NullSink),
        );
        let day = DayKey::new(
            ExchangeId::BinanceFutures,
            Symbol::parse("SOLUSDT").expect("valid"),
            parse_compact_date("20240101").expect("valid"),
        );

        let outcome = fetcher
            .fetch(&day.fetch_key(StreamKind::Trades))
            .await
            .expect("denial is not an error");
        assert_eq!(outcome, FetchOutcome::Denied);
        assert!(!fetcher.layout.raw(&day.fetch_key(StreamKind::Trades)).exists());
    }

    #[tokio::test]
    async fn fetch_day_produces_both_stream_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (http, fetcher, key) = key(dir.path());
        let day = DayKey::new(key.exchange, key.symbol.clone(), key.date);

        fetcher.fetch_day(&day).await.expect("fetch day");
        assert_eq!(http.calls.load(Ordering::SeqCst), 2);
        assert!(fetcher.layout.raw(&day.fetch_key(StreamKind::BookDeltas)).exists());
        assert!(fetcher.layout.raw(&day.fetch_key(StreamKind::Trades)).exists());
    }
}
