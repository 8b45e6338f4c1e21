//! Progress counters and the end-of-run report.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::AssetError;

/// Live counters updated by concurrent asset tasks.
///
/// Display only: nothing in the pipeline reads these to make decisions.
#[derive(Debug, Default)]
pub struct RunProgress {
    total: AtomicUsize,
    skipped: AtomicUsize,
    urls_resolved: AtomicUsize,
    downloaded: AtomicUsize,
    failed: AtomicUsize,
}

impl RunProgress {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of catalog entries selected for this run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Entries skipped because their file already exists.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Thumbnail URLs resolved so far.
    #[must_use]
    pub fn urls_resolved(&self) -> usize {
        self.urls_resolved.load(Ordering::SeqCst)
    }

    /// Downloads finished so far.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Assets that failed so far.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Entries settled so far (skipped, downloaded, or failed).
    #[must_use]
    pub fn settled(&self) -> usize {
        self.skipped() + self.downloaded() + self.failed()
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    pub(crate) fn record_skipped(&self) -> usize {
        self.skipped.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record_url_resolved(&self) -> usize {
        self.urls_resolved.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record_downloaded(&self) -> usize {
        self.downloaded.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record_failed(&self) -> usize {
        self.failed.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// One successfully written asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    pub guid: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// One failed asset and why.
#[derive(Debug)]
pub struct AssetFailure {
    pub guid: String,
    pub error: AssetError,
}

/// Aggregated outcome of a run, assembled after every task has finished.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Entries returned by the catalog.
    pub catalog_entries: usize,
    /// Entries that passed the file/extension filter.
    pub matched: usize,
    /// Matched entries whose destination already existed.
    pub skipped: usize,
    /// Assets written during this run.
    pub downloaded: Vec<DownloadedAsset>,
    /// Assets whose pipeline failed.
    pub failures: Vec<AssetFailure>,
}

impl RunReport {
    /// Number of assets for which a download was attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.downloaded.len() + self.failures.len()
    }

    /// Number of assets written during this run.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.downloaded.len()
    }

    /// Number of failed assets.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total bytes written during this run.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.downloaded.iter().map(|asset| asset.bytes).sum()
    }

    /// True when no asset failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
