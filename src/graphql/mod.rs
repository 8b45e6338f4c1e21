//! GraphQL client for the asset catalog batch endpoint.
//!
//! Every call is a POST of a one-element batch
//! (`[{query, variables, operationName}]`) carrying the session headers. The
//! response is an array in the same order; only its first element is read.
//!
//! # Operations
//!
//! - [`GraphqlClient::fetch_catalog`] - `PreviewAssets`, the asset listing of a product
//! - [`GraphqlClient::resolve_thumbnail`] - `PreviewAssetThumbnail`, one signed URL per guid

mod catalog;
mod error;
mod thumbnail;
mod types;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::session::SessionContext;
use crate::transport::{HttpClient, TransportError};

pub use catalog::PREVIEW_ASSETS_QUERY;
pub use error::ApiError;
pub use thumbnail::PREVIEW_ASSET_THUMBNAIL_QUERY;
pub use types::{AssetEntry, AssetKind, ThumbnailReference};

use types::{GraphqlRequest, GraphqlResponse};

/// Path of the batch endpoint relative to the site root.
pub const GRAPHQL_BATCH_PATH: &str = "api/graphql/batch";

/// Client for the GraphQL batch endpoint.
///
/// Holds the shared transport and the immutable session; cheap to clone.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: HttpClient,
    endpoint: String,
    session: Arc<SessionContext>,
}

impl GraphqlClient {
    /// Creates a client posting to `endpoint` with the session's headers.
    #[must_use]
    pub fn new(http: HttpClient, endpoint: impl Into<String>, session: Arc<SessionContext>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            session,
        }
    }

    /// Runs one operation as a single-element batch and returns its `data`.
    #[instrument(level = "debug", skip(self, query, variables))]
    async fn execute<V, T>(
        &self,
        operation: &'static str,
        query: &str,
        variables: V,
    ) -> Result<T, ApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = [GraphqlRequest {
            query,
            variables,
            operation_name: operation,
        }];

        let response = self
            .http
            .post_json(&self.endpoint, &body, self.session.headers())
            .await
            .map_err(|e| ApiError::transport(operation, e))?;

        let bytes = response.bytes().await.map_err(|e| {
            ApiError::transport(operation, TransportError::network(self.endpoint.as_str(), e))
        })?;
        debug!(bytes = bytes.len(), "received batch response");

        let batch: Vec<GraphqlResponse<T>> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(operation, e))?;
        let first = batch
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyBatch { operation })?;

        if let Some(error) = first.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(ApiError::GraphQl {
                operation,
                message: error.message.clone(),
            });
        }

        first
            .data
            .ok_or_else(|| ApiError::missing_field(operation, "data"))
    }
}
