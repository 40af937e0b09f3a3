//! Shared HTTP client construction policy for transports.
//!
//! All transports share one connection pool and one timeout so every attempt
//! in the chain is bounded the same way.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

use super::FetchError;

/// Upper bound on the TCP/TLS connect phase; never longer than the attempt timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client used by every transport.
///
/// `timeout` bounds each whole request (connect, headers and body).
///
/// # Errors
///
/// Returns [`FetchError::ClientBuild`] when the TLS backend or system
/// configuration prevents client construction.
pub fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
    debug!(timeout_secs = timeout.as_secs(), "Building transport HTTP client");
    Client::builder()
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .timeout(timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
        .map_err(|error| FetchError::ClientBuild {
            reason: error.to_string(),
        })
}
