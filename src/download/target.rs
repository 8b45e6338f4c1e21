//! Catalog filtering and destination paths.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use super::error::OrchestratorError;
use crate::graphql::AssetEntry;

/// Where one asset is written: `<output_root>/<product_id>/<guid>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub guid: String,
    pub destination: PathBuf,
}

impl DownloadTarget {
    /// Builds the deterministic destination for `guid`.
    ///
    /// ```
    /// use std::path::Path;
    /// use asset_preview::download::DownloadTarget;
    ///
    /// let target = DownloadTarget::new(Path::new("content"), "123", "g1", "png");
    /// assert_eq!(target.destination, Path::new("content/123/g1.png"));
    /// ```
    #[must_use]
    pub fn new(output_root: &Path, product_id: &str, guid: &str, extension: &str) -> Self {
        Self {
            guid: guid.to_string(),
            destination: output_root
                .join(product_id)
                .join(format!("{guid}.{extension}")),
        }
    }

    /// Returns true if something already exists at the destination.
    ///
    /// Existence alone counts as "already downloaded": an empty or truncated
    /// file from an earlier failed run is never re-fetched.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.destination)
            .await
            .unwrap_or(false)
    }
}

/// Strips a leading `.` and rejects values that are not a bare extension.
///
/// # Errors
///
/// Returns [`OrchestratorError::InvalidExtension`] for empty values or values
/// containing path separators or further dots.
pub fn normalize_extension(extension: &str) -> Result<String, OrchestratorError> {
    let trimmed = extension.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() || bare.contains(['.', '/', '\\']) {
        return Err(OrchestratorError::InvalidExtension {
            extension: extension.to_string(),
        });
    }
    Ok(bare.to_string())
}

/// Returns true if `value` is exactly one plain path component.
///
/// Rejects empty values, `.`, `..`, anything with `/` or `\`, and values a
/// platform would read as a root or prefix. Guids and product ids must pass
/// before they are joined onto the output root.
///
/// ```
/// use asset_preview::download::is_single_path_component;
///
/// assert!(is_single_path_component("5f1c-9a"));
/// assert!(!is_single_path_component("../escaped"));
/// ```
#[must_use]
pub fn is_single_path_component(value: &str) -> bool {
    if value.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Keeps file entries with the given extension, first occurrence per guid.
///
/// Guids are expected to be unique; duplicates are dropped so no two tasks
/// ever write the same destination.
#[must_use]
pub fn select_images<'a>(entries: &'a [AssetEntry], extension: &str) -> Vec<&'a AssetEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| entry.is_file_with_extension(extension))
        .filter(|entry| seen.insert(entry.guid.as_str()))
        .collect()
}
