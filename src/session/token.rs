//! Anti-forgery token extraction from `set-cookie` headers.

use std::fmt;
use std::str::FromStr;

use super::error::SessionError;

/// Name of the cookie carrying the anti-forgery token.
pub const CSRF_COOKIE_NAME: &str = "_csrf";

/// Byte range of the token inside the first `set-cookie` entry when using
/// [`TokenExtraction::FixedOffset`] (`_csrf=` is six bytes, token is 32).
const FIXED_OFFSET_RANGE: std::ops::Range<usize> = 6..38;

/// How the anti-forgery token is pulled out of the bootstrap response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenExtraction {
    /// Take bytes 6..38 of the first `set-cookie` entry, whatever it holds.
    ///
    /// Matches servers that always send `_csrf=<32 chars>` first. Breaks if
    /// the cookie order or name length ever changes.
    FixedOffset,

    /// Parse each `set-cookie` entry and take the value of the named cookie.
    Cookie {
        /// Cookie name to look for.
        name: String,
    },
}

impl Default for TokenExtraction {
    fn default() -> Self {
        Self::Cookie {
            name: CSRF_COOKIE_NAME.to_string(),
        }
    }
}

impl fmt::Display for TokenExtraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedOffset => f.write_str("offset"),
            Self::Cookie { name } if name == CSRF_COOKIE_NAME => f.write_str("cookie"),
            Self::Cookie { name } => write!(f, "cookie:{name}"),
        }
    }
}

impl FromStr for TokenExtraction {
    type Err = String;

    /// Accepts `offset`, `cookie`, or `cookie:<name>`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "offset" => Ok(Self::FixedOffset),
            "cookie" => Ok(Self::default()),
            other => match other.strip_prefix("cookie:").map(str::trim) {
                Some(name) if !name.is_empty() && !name.contains(['=', ';', ' ']) => {
                    Ok(Self::Cookie {
                        name: name.to_string(),
                    })
                }
                _ => Err(format!(
                    "unknown token extraction '{other}': expected `offset`, `cookie`, or `cookie:<name>`"
                )),
            },
        }
    }
}

impl TokenExtraction {
    /// Name of the cookie the token is sent back in.
    ///
    /// Offset mode assumes the canonical `_csrf` cookie.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        match self {
            Self::FixedOffset => CSRF_COOKIE_NAME,
            Self::Cookie { name } => name,
        }
    }

    /// Extracts the token from the raw `set-cookie` entries of a response.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedCookie`] when the entries don't yield
    /// a token under this strategy. Callers handle the no-entries case.
    pub fn extract<'a, I>(&self, set_cookies: I) -> Result<String, SessionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            Self::FixedOffset => {
                let first = set_cookies
                    .into_iter()
                    .next()
                    .ok_or_else(|| SessionError::malformed_cookie("no set-cookie entries"))?;
                extract_fixed_offset(first)
            }
            Self::Cookie { name } => set_cookies
                .into_iter()
                .find_map(|entry| cookie_value(entry, name))
                .map(str::to_string)
                .ok_or_else(|| {
                    SessionError::malformed_cookie(format!("no non-empty `{name}` cookie was set"))
                }),
        }
    }
}

fn extract_fixed_offset(entry: &str) -> Result<String, SessionError> {
    entry
        .get(FIXED_OFFSET_RANGE)
        .map(str::to_string)
        .ok_or_else(|| {
            SessionError::malformed_cookie(format!(
                "first set-cookie entry is {} bytes, need at least {}",
                entry.len(),
                FIXED_OFFSET_RANGE.end
            ))
        })
}

/// Returns the value of `name` if `entry` sets that cookie.
///
/// Only the leading `name=value` pair is considered; the attributes after
/// the first `;` (Path, Expires, ...) are ignored.
fn cookie_value<'a>(entry: &'a str, name: &str) -> Option<&'a str> {
    let pair = entry.split(';').next()?;
    let (key, value) = pair.split_once('=')?;
    let value = value.trim().trim_matches('"');
    (key.trim() == name && !value.is_empty()).then_some(value)
}
