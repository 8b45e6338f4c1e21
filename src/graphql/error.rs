//! Error types for GraphQL API calls.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while calling the GraphQL batch endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or returned an error status.
    #[error("{operation} request failed: {source}")]
    Transport {
        /// GraphQL operation name.
        operation: &'static str,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The response body is not a JSON batch of the expected shape.
    #[error("{operation} returned an unreadable response: {source}")]
    Decode {
        /// GraphQL operation name.
        operation: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The batch response array was empty.
    #[error("{operation} returned an empty batch response")]
    EmptyBatch {
        /// GraphQL operation name.
        operation: &'static str,
    },

    /// The server reported a GraphQL error for the operation.
    #[error("{operation} failed: {message}")]
    GraphQl {
        /// GraphQL operation name.
        operation: &'static str,
        /// First error message reported by the server.
        message: String,
    },

    /// A required field was absent or null in the response.
    #[error("{operation} response is missing `{field}`")]
    MissingField {
        /// GraphQL operation name.
        operation: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
    },
}

impl ApiError {
    /// Creates a transport error for an operation.
    pub fn transport(operation: &'static str, source: TransportError) -> Self {
        Self::Transport { operation, source }
    }

    /// Creates a decode error for an operation.
    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }

    /// Creates a missing-field error for an operation.
    pub fn missing_field(operation: &'static str, field: &'static str) -> Self {
        Self::MissingField { operation, field }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_missing_field_display() {
        let error = ApiError::missing_field("PreviewAssets", "data.product.assets");
        let msg = error.to_string();
        assert!(msg.contains("PreviewAssets"), "Expected operation in: {msg}");
        assert!(msg.contains("data.product.assets"), "Expected field in: {msg}");
    }

    #[test]
    fn test_api_error_transport_keeps_source() {
        let error = ApiError::transport(
            "PreviewAssetThumbnail",
            TransportError::http_status("https://example.com/api/graphql/batch", 500),
        );
        assert!(error.to_string().contains("HTTP 500"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
