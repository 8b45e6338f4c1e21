//! Error types for session bootstrap.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while establishing the API session.
///
/// Every variant is fatal for a run: without a token no header set can be
/// built for the GraphQL calls.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The bootstrap request itself failed.
    #[error("session bootstrap request failed: {0}")]
    Transport(#[from] TransportError),

    /// The bootstrap response carried no `set-cookie` header.
    #[error("no set-cookie header in response from {url}\n  Suggestion: check --base-url points at the site root")]
    MissingCookie {
        /// The URL that was requested.
        url: String,
    },

    /// A `set-cookie` header was present but the token could not be taken from it.
    #[error("could not extract anti-forgery token: {reason}")]
    MalformedCookie {
        /// Why extraction failed. Never contains the cookie value.
        reason: String,
    },
}

impl SessionError {
    /// Creates a `MissingCookie` error.
    pub fn missing_cookie(url: impl Into<String>) -> Self {
        Self::MissingCookie { url: url.into() }
    }

    /// Creates a `MalformedCookie` error.
    pub fn malformed_cookie(reason: impl Into<String>) -> Self {
        Self::MalformedCookie {
            reason: reason.into(),
        }
    }
}
