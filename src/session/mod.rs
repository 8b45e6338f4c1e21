//! Session bootstrap: anti-forgery token and the header set for API calls.
//!
//! One unauthenticated GET to the site root yields a `set-cookie` header
//! holding the anti-forgery token. The token is turned into an immutable
//! [`SessionContext`] whose headers are attached to every GraphQL request.
//! There is no renewal: the context lives for the whole run.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use asset_preview::session::{TokenExtraction, init_session};
//! use asset_preview::transport::{HttpClient, RateLimiter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Arc::new(RateLimiter::per_second(150)))?;
//! let session = init_session(&client, "https://assetstore.unity.com/", &TokenExtraction::default()).await?;
//! assert_eq!(session.csrf_token().len(), 32);
//! # Ok(())
//! # }
//! ```

mod error;
mod token;

use std::fmt;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use tracing::{debug, info, instrument};

use crate::transport::HttpClient;

pub use error::SessionError;
pub use token::{CSRF_COOKIE_NAME, TokenExtraction};

/// Header marking requests as AJAX calls.
pub const REQUESTED_WITH_HEADER: HeaderName = HeaderName::from_static("x-requested-with");

/// Header carrying the anti-forgery token.
pub const CSRF_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// Immutable per-run session state shared by every API call.
///
/// The token value is redacted in `Debug` output.
#[derive(Clone)]
pub struct SessionContext {
    csrf_token: String,
    headers: HeaderMap,
}

impl SessionContext {
    /// Builds the session header set for an anti-forgery token.
    ///
    /// Headers: `X-Requested-With: XMLHttpRequest`, `X-Csrf-Token: <token>`
    /// and `Cookie: <cookie_name>=<token>`, where `cookie_name` is the cookie
    /// the token was read from (usually [`CSRF_COOKIE_NAME`]).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedCookie`] if the token or cookie name
    /// holds bytes that are not valid in an HTTP header value.
    pub fn from_token(
        token: impl Into<String>,
        cookie_name: &str,
    ) -> Result<Self, SessionError> {
        let csrf_token = token.into();
        let invalid =
            |_| SessionError::malformed_cookie("token contains characters not valid in a header");

        let mut headers = HeaderMap::new();
        headers.insert(
            REQUESTED_WITH_HEADER,
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            CSRF_TOKEN_HEADER,
            HeaderValue::from_str(&csrf_token).map_err(invalid)?,
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{cookie_name}={csrf_token}")).map_err(invalid)?,
        );

        Ok(Self {
            csrf_token,
            headers,
        })
    }

    /// Returns the anti-forgery token.
    ///
    /// Sensitive: avoid logging the return value.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Returns the headers to attach to every API request.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("csrf_token", &"[REDACTED]")
            .field("header_count", &self.headers.len())
            .finish()
    }
}

/// Performs the bootstrap GET and derives the session from its cookies.
///
/// Exactly one request is made. No validation of the token beyond the
/// chosen extraction strategy is performed.
///
/// # Errors
///
/// - [`SessionError::Transport`] if the request fails or returns an error status
/// - [`SessionError::MissingCookie`] if the response has no `set-cookie` header
/// - [`SessionError::MalformedCookie`] if no token can be extracted
#[instrument(skip(client), fields(extraction = %extraction))]
pub async fn init_session(
    client: &HttpClient,
    site_url: &str,
    extraction: &TokenExtraction,
) -> Result<SessionContext, SessionError> {
    let response = client.get(site_url).await?;

    let set_cookies: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    debug!(entries = set_cookies.len(), "received set-cookie entries");

    if set_cookies.is_empty() {
        return Err(SessionError::missing_cookie(site_url));
    }

    let token = extraction.extract(set_cookies)?;
    let session = SessionContext::from_token(token, extraction.cookie_name())?;
    info!("session established");
    Ok(session)
}
