//! Shared User-Agent string for every transport.
//!
//! Proxies and the upstream API all see the same identification so traffic
//! from the proxy chain and the direct attempt is consistent.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/culture-read/culture-read";

/// Default User-Agent for catalog requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("culture-read/{version} (digital-library-client; +{PROJECT_UA_URL})")
}
