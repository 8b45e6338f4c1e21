//! `PreviewAssets`: list the assets of a product.

use serde::Serialize;
use tracing::{info, instrument};

use super::types::CatalogData;
use super::{ApiError, AssetEntry, GraphqlClient};

const OPERATION: &str = "PreviewAssets";

/// Catalog query. Accepts a page but none is sent, so the server's default
/// page is returned.
pub const PREVIEW_ASSETS_QUERY: &str = "query PreviewAssets($id: ID!, $page: Int) {
  product(id: $id) {
    assets(page: $page) {
      guid assetId: asset_id label level type __typename
    }
  }
}";

#[derive(Debug, Serialize)]
struct CatalogVariables<'a> {
    id: &'a str,
}

impl GraphqlClient {
    /// Fetches every asset entry of `product_id` in a single call.
    ///
    /// No pagination loop is performed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails or the response lacks
    /// `data.product.assets`.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self, product_id: &str) -> Result<Vec<AssetEntry>, ApiError> {
        let data: CatalogData = self
            .execute(
                OPERATION,
                PREVIEW_ASSETS_QUERY,
                CatalogVariables { id: product_id },
            )
            .await?;

        let assets = data
            .product
            .ok_or_else(|| ApiError::missing_field(OPERATION, "data.product"))?
            .assets
            .ok_or_else(|| ApiError::missing_field(OPERATION, "data.product.assets"))?;

        info!(entries = assets.len(), "catalog loaded");
        Ok(assets)
    }
}
