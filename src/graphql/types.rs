//! Wire and domain types for the asset catalog API.

use serde::{Deserialize, Serialize};

/// One query in a batch request body.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
}

/// One element of a batch response body.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorMessage {
    pub message: String,
}

/// Kind of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    File,
    Folder,
    /// Any type this client doesn't know about. Never downloaded.
    #[serde(other)]
    Other,
}

/// A single asset listed in a product's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetEntry {
    /// Opaque unique identifier.
    pub guid: String,
    /// Store-side asset id, when reported.
    #[serde(default, rename = "assetId")]
    pub asset_id: Option<String>,
    /// Display name; its extension determines the file type.
    pub label: String,
    /// Nesting depth in the catalog tree, when reported.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(rename = "type")]
    pub kind: AssetKind,
}

impl AssetEntry {
    /// Returns the text after the last `.` of the label, if any.
    ///
    /// ```
    /// use asset_preview::graphql::{AssetEntry, AssetKind};
    ///
    /// let entry = AssetEntry {
    ///     guid: "g1".into(),
    ///     asset_id: None,
    ///     label: "Textures/Rock.Diffuse.PNG".into(),
    ///     level: None,
    ///     kind: AssetKind::File,
    /// };
    /// assert_eq!(entry.extension(), Some("PNG"));
    /// ```
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.label.rsplit(['/', '\\']).next().unwrap_or(&self.label);
        name.rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Returns true for file entries whose extension equals `extension`,
    /// ignoring ASCII case.
    #[must_use]
    pub fn is_file_with_extension(&self, extension: &str) -> bool {
        self.kind == AssetKind::File
            && self
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Signed thumbnail location for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailReference {
    pub product_id: String,
    /// Scheme-relative URL (`//host/path?query`).
    pub asset_thumbnail: String,
}

impl ThumbnailReference {
    /// Returns the absolute URL obtained by prefixing `scheme:`.
    ///
    /// ```
    /// use asset_preview::graphql::ThumbnailReference;
    ///
    /// let thumb = ThumbnailReference {
    ///     product_id: "123".into(),
    ///     asset_thumbnail: "//cdn.example.com/t/g1.png?sig=x".into(),
    /// };
    /// assert_eq!(thumb.absolute_url("https"), "https://cdn.example.com/t/g1.png?sig=x");
    /// ```
    #[must_use]
    pub fn absolute_url(&self, scheme: &str) -> String {
        format!("{scheme}:{}", self.asset_thumbnail)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogData {
    pub product: Option<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogProduct {
    pub assets: Option<Vec<AssetEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThumbnailData {
    pub product: Option<ThumbnailProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThumbnailProduct {
    pub id: Option<String>,
    #[serde(rename = "assetThumbnail")]
    pub asset_thumbnail: Option<String>,
}
