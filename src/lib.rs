//! Asset Preview Library
//!
//! This library downloads the preview images of one asset store product:
//! it bootstraps an anonymous API session, lists the product's assets over
//! GraphQL, keeps the image files, resolves each one's thumbnail URL and
//! streams it to disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - Rate-limited HTTP client shared by every request
//! - [`session`] - Anti-forgery token bootstrap and API headers
//! - [`graphql`] - Catalog listing and thumbnail resolution
//! - [`download`] - Filtering, skip-if-exists and concurrent downloads
//! - [`pipeline`] - End-to-end wiring for one run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod graphql;
pub mod pipeline;
pub mod session;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use download::{
    AssetError, AssetFailure, DownloadOrchestrator, DownloadedAsset, OrchestratorError,
    RunProgress, RunReport,
};
pub use graphql::{ApiError, AssetEntry, AssetKind, GraphqlClient, ThumbnailReference};
pub use pipeline::{PipelineConfig, PipelineError, run_pipeline};
pub use session::{SessionContext, SessionError, TokenExtraction, init_session};
pub use transport::{HttpClient, RateLimiter, TransportError};
