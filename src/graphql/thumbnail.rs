//! `PreviewAssetThumbnail`: resolve the signed thumbnail URL of one asset.

use serde::Serialize;
use tracing::{debug, instrument};

use super::types::ThumbnailData;
use super::{ApiError, GraphqlClient, ThumbnailReference};

const OPERATION: &str = "PreviewAssetThumbnail";

pub const PREVIEW_ASSET_THUMBNAIL_QUERY: &str = "query PreviewAssetThumbnail($id: ID!, $guid: String!) {
  product(id: $id) {
    id
    assetThumbnail(guid: $guid)
  }
}";

#[derive(Debug, Serialize)]
struct ThumbnailVariables<'a> {
    id: &'a str,
    guid: &'a str,
}

impl GraphqlClient {
    /// Resolves the thumbnail of one asset. One request per call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails or the response lacks
    /// `data.product` or its `assetThumbnail`.
    #[instrument(skip(self))]
    pub async fn resolve_thumbnail(
        &self,
        product_id: &str,
        guid: &str,
    ) -> Result<ThumbnailReference, ApiError> {
        let data: ThumbnailData = self
            .execute(
                OPERATION,
                PREVIEW_ASSET_THUMBNAIL_QUERY,
                ThumbnailVariables {
                    id: product_id,
                    guid,
                },
            )
            .await?;

        let product = data
            .product
            .ok_or_else(|| ApiError::missing_field(OPERATION, "data.product"))?;
        let asset_thumbnail = product
            .asset_thumbnail
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::missing_field(OPERATION, "data.product.assetThumbnail"))?;

        debug!("thumbnail resolved");
        Ok(ThumbnailReference {
            product_id: product.id.unwrap_or_else(|| product_id.to_string()),
            asset_thumbnail,
        })
    }
}
