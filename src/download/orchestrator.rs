//! Catalog-to-disk orchestration.
//!
//! The orchestrator fetches a product's catalog, keeps the image entries, and
//! launches one independent task per asset that is not already on disk. Each
//! task resolves the asset's thumbnail URL and streams it to its destination.
//!
//! # Concurrency Model
//!
//! - Every task is spawned eagerly; there is no concurrency cap
//! - The shared [`HttpClient`]'s rate limiter is the only throttle
//! - Tasks finish in any order; a failure in one never touches another
//! - All tasks are joined before [`DownloadOrchestrator::run`] returns
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use asset_preview::download::DownloadOrchestrator;
//! use asset_preview::graphql::GraphqlClient;
//! use asset_preview::session::{CSRF_COOKIE_NAME, SessionContext};
//! use asset_preview::transport::{HttpClient, RateLimiter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpClient::new(Arc::new(RateLimiter::per_second(150)))?;
//! let session = Arc::new(SessionContext::from_token("token", CSRF_COOKIE_NAME)?);
//! let api = GraphqlClient::new(http.clone(), "https://example.com/api/graphql/batch", session);
//! let orchestrator = DownloadOrchestrator::new(api, http, "content");
//! let report = orchestrator.run("12345", "png").await?;
//! println!("downloaded {}, failed {}", report.completed(), report.failed());
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::error::{AssetError, OrchestratorError};
use super::progress::{AssetFailure, DownloadedAsset, RunProgress, RunReport};
use super::target::{DownloadTarget, is_single_path_component, normalize_extension, select_images};
use crate::graphql::GraphqlClient;
use crate::transport::HttpClient;

/// Scheme prefixed to scheme-relative thumbnail URLs unless overridden.
pub const DEFAULT_THUMBNAIL_SCHEME: &str = "https";

/// Downloads every image asset of a product that is not yet on disk.
#[derive(Debug)]
pub struct DownloadOrchestrator {
    api: GraphqlClient,
    http: HttpClient,
    output_root: PathBuf,
    thumbnail_scheme: String,
    progress: Arc<RunProgress>,
}

impl DownloadOrchestrator {
    /// Creates an orchestrator writing under `output_root`.
    #[must_use]
    pub fn new(api: GraphqlClient, http: HttpClient, output_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            http,
            output_root: output_root.into(),
            thumbnail_scheme: DEFAULT_THUMBNAIL_SCHEME.to_string(),
            progress: Arc::new(RunProgress::new()),
        }
    }

    /// Overrides the scheme prefixed to thumbnail URLs (`https` by default).
    #[must_use]
    pub fn with_thumbnail_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.thumbnail_scheme = scheme.into();
        self
    }

    /// Uses an externally owned progress tracker, e.g. one polled by a UI.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<RunProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the whole pipeline for one product.
    ///
    /// 1. Creates `<output_root>/<product_id>`
    /// 2. Fetches the catalog
    /// 3. Keeps file entries with the given extension
    /// 4. Skips entries whose destination exists; spawns a task for each other one
    /// 5. Joins every task into a [`RunReport`]
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] when the extension or product id is
    /// invalid, the output directory cannot be created, or the catalog cannot
    /// be fetched. Per-asset failures, including guids that are not a single
    /// path component, are reported in the returned [`RunReport`].
    #[instrument(skip(self), fields(output_root = %self.output_root.display()))]
    pub async fn run(
        &self,
        product_id: &str,
        extension: &str,
    ) -> Result<RunReport, OrchestratorError> {
        let extension = normalize_extension(extension)?;
        if !is_single_path_component(product_id) {
            return Err(OrchestratorError::InvalidProductId {
                product_id: product_id.to_string(),
            });
        }

        let product_dir = self.output_root.join(product_id);
        tokio::fs::create_dir_all(&product_dir)
            .await
            .map_err(|e| OrchestratorError::create_dir(&product_dir, e))?;
        debug!(dir = %product_dir.display(), "output directory ready");

        let entries = self
            .api
            .fetch_catalog(product_id)
            .await
            .map_err(OrchestratorError::Catalog)?;

        let selected = select_images(&entries, &extension);
        info!(
            catalog_entries = entries.len(),
            matched = selected.len(),
            extension = %extension,
            "images filtered"
        );

        self.progress.set_total(selected.len());
        let mut report = RunReport {
            catalog_entries: entries.len(),
            matched: selected.len(),
            ..RunReport::default()
        };

        let mut tasks = JoinSet::new();
        let mut task_guids: HashMap<Id, String> = HashMap::new();
        for entry in selected {
            if !is_single_path_component(&entry.guid) {
                let failed = self.progress.record_failed();
                warn!(guid = %entry.guid, failed, "guid is not a usable file name, skipping");
                report.failures.push(AssetFailure {
                    guid: entry.guid.clone(),
                    error: AssetError::InvalidGuid {
                        guid: entry.guid.clone(),
                    },
                });
                continue;
            }

            let target = DownloadTarget::new(&self.output_root, product_id, &entry.guid, &extension);

            if target.exists().await {
                self.progress.record_skipped();
                report.skipped += 1;
                debug!(guid = %target.guid, "already downloaded, skipping");
                continue;
            }

            let job = AssetJob {
                api: self.api.clone(),
                http: self.http.clone(),
                product_id: product_id.to_string(),
                scheme: self.thumbnail_scheme.clone(),
                progress: Arc::clone(&self.progress),
                target,
            };
            let handle = tasks.spawn(job.run());
            task_guids.insert(handle.id(), entry.guid.clone());
        }

        debug!(task_count = tasks.len(), "waiting for downloads to complete");

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Ok(asset))) => report.downloaded.push(asset),
                Ok((_, Err(failure))) => report.failures.push(failure),
                Err(e) => report
                    .failures
                    .push(lost_task_failure(e, &task_guids, &self.progress)),
            }
        }

        info!(
            downloaded = report.completed(),
            failed = report.failed(),
            skipped = report.skipped,
            bytes = report.bytes_written(),
            "run complete"
        );

        Ok(report)
    }
}

/// Everything one spawned asset task owns.
struct AssetJob {
    api: GraphqlClient,
    http: HttpClient,
    product_id: String,
    scheme: String,
    progress: Arc<RunProgress>,
    target: DownloadTarget,
}

impl AssetJob {
    async fn run(self) -> Result<DownloadedAsset, AssetFailure> {
        let guid = self.target.guid.clone();
        let progress = Arc::clone(&self.progress);

        let outcome = match AssertUnwindSafe(self.fetch()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => Err(AssetError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        };

        outcome.map_err(|error| {
            let failed = progress.record_failed();
            warn!(guid = %guid, failed, error = %error, "asset failed");
            AssetFailure { guid, error }
        })
    }

    #[instrument(skip(self), fields(guid = %self.target.guid))]
    async fn fetch(self) -> Result<DownloadedAsset, AssetError> {
        let total = self.progress.total();

        let thumbnail = self
            .api
            .resolve_thumbnail(&self.product_id, &self.target.guid)
            .await
            .map_err(AssetError::Resolve)?;
        let resolved = self.progress.record_url_resolved();
        info!(resolved, total, "url loaded");

        let url = thumbnail.absolute_url(&self.scheme);
        let bytes = self
            .http
            .stream_to_file(&url, &self.target.destination)
            .await
            .map_err(AssetError::Download)?;
        let downloaded = self.progress.record_downloaded();
        info!(downloaded, total, bytes, "downloaded");

        Ok(DownloadedAsset {
            guid: self.target.guid,
            path: self.target.destination,
            bytes,
        })
    }
}

/// Turns a task that never produced an outcome into a failure for its guid.
fn lost_task_failure(
    error: JoinError,
    task_guids: &HashMap<Id, String>,
    progress: &RunProgress,
) -> AssetFailure {
    let id = error.id();
    let guid = task_guids
        .get(&id)
        .cloned()
        .unwrap_or_else(|| format!("task-{id}"));
    let error = match error.try_into_panic() {
        Ok(payload) => AssetError::Panicked {
            message: panic_message(payload.as_ref()),
        },
        Err(_) => AssetError::Cancelled,
    };

    let failed = progress.record_failed();
    warn!(guid = %guid, failed, error = %error, "download task did not complete");
    AssetFailure { guid, error }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
