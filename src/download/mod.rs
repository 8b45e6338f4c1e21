//! Image selection and concurrent download orchestration.
//!
//! This module turns a product catalog into files on disk under
//! `<output_root>/<product_id>/<guid>.<extension>`.
//!
//! # Features
//!
//! - Filters catalog entries to files with the configured extension
//! - Skips assets whose destination already exists (no network calls for them)
//! - One task per remaining asset, all in flight at once behind the shared rate limiter
//! - Per-asset failures (including panics) are collected, never propagated to siblings
//! - Live [`RunProgress`] counters and a final [`RunReport`]

mod error;
mod orchestrator;
mod progress;
mod target;

pub use error::{AssetError, OrchestratorError};
pub use orchestrator::{DEFAULT_THUMBNAIL_SCHEME, DownloadOrchestrator};
pub use progress::{AssetFailure, DownloadedAsset, RunProgress, RunReport};
pub use target::{DownloadTarget, is_single_path_component, normalize_extension, select_images};
