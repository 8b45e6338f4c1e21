//! Error types for the transport module.
//!
//! Every outbound request (session bootstrap, GraphQL calls, image streams)
//! reports failures through [`TransportError`], carrying the URL or path
//! that was being worked on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while issuing a request or streaming a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connection attempt timed out.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a response body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl TransportError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the HTTP status code when the failure was a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path, which the source errors don't carry. Use the constructors.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_timeout_display() {
        let error = TransportError::Timeout {
            url: "https://example.com/api".to_string(),
        };
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/api"));
    }

    #[test]
    fn test_transport_error_http_status_display() {
        let error = TransportError::http_status("https://example.com/thumb.png", 403);
        let msg = error.to_string();
        assert!(msg.contains("403"), "Expected '403' in: {msg}");
        assert!(
            msg.contains("https://example.com/thumb.png"),
            "Expected URL in: {msg}"
        );
        assert_eq!(error.status(), Some(403));
    }

    #[test]
    fn test_transport_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = TransportError::io(PathBuf::from("/tmp/g1.png"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/g1.png"), "Expected path in: {msg}");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_transport_error_invalid_url_display() {
        let error = TransportError::invalid_url("https:not a url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("https:not a url"), "Expected URL in: {msg}");
    }
}
