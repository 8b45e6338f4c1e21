//! End-to-end run: session bootstrap, catalog, downloads.
//!
//! [`run_pipeline`] wires the layers together in dependency order. One
//! [`RateLimiter`] is created per run and shared by the bootstrap request,
//! every GraphQL call and every image download.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::download::{
    DEFAULT_THUMBNAIL_SCHEME, DownloadOrchestrator, OrchestratorError, RunProgress, RunReport,
};
use crate::graphql::{GRAPHQL_BATCH_PATH, GraphqlClient};
use crate::session::{SessionError, TokenExtraction, init_session};
use crate::transport::{DEFAULT_REQUESTS_PER_SECOND, HttpClient, RateLimiter, TransportError};

/// Site root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://assetstore.unity.com";

/// Output root used when none is configured.
pub const DEFAULT_OUTPUT_ROOT: &str = "content";

/// Extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "png";

/// Everything one run needs. All values are fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Site root; the bootstrap GET targets it and the batch endpoint hangs off it.
    pub base_url: String,
    /// Product whose assets are downloaded.
    pub product_id: String,
    /// Image extension to select and to name files with.
    pub extension: String,
    /// Directory under which `<product_id>/` is created.
    pub output_root: PathBuf,
    /// Global request ceiling per second; 0 disables limiting.
    pub requests_per_second: u32,
    /// Scheme prefixed to scheme-relative thumbnail URLs.
    pub thumbnail_scheme: String,
    /// How the anti-forgery token is taken from the bootstrap response.
    pub token_extraction: TokenExtraction,
}

impl PipelineConfig {
    /// Creates a config for `product_id` with every other value defaulted.
    #[must_use]
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            product_id: product_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            thumbnail_scheme: DEFAULT_THUMBNAIL_SCHEME.to_string(),
            token_extraction: TokenExtraction::default(),
        }
    }
}

/// Errors that abort a run before or instead of producing a [`RunReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}'\n  Suggestion: use an absolute URL such as https://assetstore.unity.com")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },

    /// The HTTP client could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session could not be established.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The run failed as a whole.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

/// Site root and batch endpoint derived from a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// URL of the bootstrap GET, always ending in `/`.
    pub site: String,
    /// URL of the GraphQL batch endpoint.
    pub graphql: String,
}

impl Endpoints {
    /// Derives both endpoints, keeping any path prefix of `base_url`.
    ///
    /// ```
    /// use asset_preview::pipeline::Endpoints;
    ///
    /// let endpoints = Endpoints::from_base_url("https://assetstore.unity.com").unwrap();
    /// assert_eq!(endpoints.site, "https://assetstore.unity.com/");
    /// assert_eq!(endpoints.graphql, "https://assetstore.unity.com/api/graphql/batch");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBaseUrl`] unless `base_url` is an
    /// absolute `http` or `https` URL.
    pub fn from_base_url(base_url: &str) -> Result<Self, PipelineError> {
        let invalid = || PipelineError::InvalidBaseUrl {
            url: base_url.to_string(),
        };

        let mut site = Url::parse(base_url.trim()).map_err(|_| invalid())?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(invalid());
        }
        if !site.path().ends_with('/') {
            let path = format!("{}/", site.path());
            site.set_path(&path);
        }
        site.set_query(None);
        site.set_fragment(None);

        let graphql = site.join(GRAPHQL_BATCH_PATH).map_err(|_| invalid())?;
        Ok(Self {
            site: site.into(),
            graphql: graphql.into(),
        })
    }
}

/// Runs one product end to end.
///
/// Counters in `progress` are updated live so a caller can render them
/// while the run is in flight.
///
/// # Errors
///
/// Returns [`PipelineError`] for fatal failures: bad base URL, client
/// construction, session bootstrap, output directory or catalog fetch.
/// Per-asset failures are reported in the returned [`RunReport`].
#[instrument(skip(config, progress), fields(product_id = %config.product_id))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    progress: Arc<RunProgress>,
) -> Result<RunReport, PipelineError> {
    let endpoints = Endpoints::from_base_url(&config.base_url)?;

    let rate_limiter = Arc::new(RateLimiter::per_second(config.requests_per_second));
    let http = HttpClient::new(rate_limiter)?;

    let session = init_session(&http, &endpoints.site, &config.token_extraction).await?;
    let api = GraphqlClient::new(http.clone(), endpoints.graphql, Arc::new(session));

    let orchestrator = DownloadOrchestrator::new(api, http, &config.output_root)
        .with_thumbnail_scheme(&config.thumbnail_scheme)
        .with_progress(progress);
    let report = orchestrator
        .run(&config.product_id, &config.extension)
        .await?;

    info!(
        downloaded = report.completed(),
        skipped = report.skipped,
        failed = report.failed(),
        "pipeline finished"
    );
    Ok(report)
}
