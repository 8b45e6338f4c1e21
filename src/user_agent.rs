//! User-Agent string for outbound requests.

/// Default User-Agent for every request: `<package>/<version>`.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
