//! Error types for download orchestration.

use std::path::PathBuf;

use thiserror::Error;

use crate::graphql::ApiError;
use crate::transport::TransportError;

/// Failure of a single asset's pipeline. Never affects sibling assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The thumbnail URL could not be resolved.
    #[error("thumbnail resolution failed: {0}")]
    Resolve(#[source] ApiError),

    /// The image could not be fetched or written.
    #[error("download failed: {0}")]
    Download(#[source] TransportError),

    /// The catalog's guid cannot be used as a file name.
    #[error("guid '{guid}' is not a single path component")]
    InvalidGuid {
        /// The rejected guid.
        guid: String,
    },

    /// The asset's task was cancelled before finishing.
    #[error("download task was cancelled")]
    Cancelled,

    /// The asset's task panicked.
    #[error("download task panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The configured extension is empty or not a bare extension.
    #[error("invalid file extension '{extension}': expected a bare extension such as `png`")]
    InvalidExtension {
        /// The rejected value.
        extension: String,
    },

    /// The product id cannot be used as a directory name.
    #[error("invalid product id '{product_id}': must be a single path component")]
    InvalidProductId {
        /// The rejected value.
        product_id: String,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog could not be fetched.
    #[error("catalog fetch failed: {0}")]
    Catalog(#[source] ApiError),
}

impl OrchestratorError {
    /// Creates a directory creation error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}
