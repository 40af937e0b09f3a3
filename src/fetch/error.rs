//! Error types for the resilient fetcher.
//!
//! Every variant carries the transport that produced it and the target URL
//! with its access keys redacted, so messages can be shown to users and
//! written to logs without leaking credentials.

use thiserror::Error;

/// Errors that can occur while fetching a JSON payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },

    /// Network-level error (DNS, connection refused, TLS, body read).
    #[error("[{transport}] network error fetching {url}: {source}")]
    Network {
        /// Transport that issued the request.
        transport: String,
        /// Redacted target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The attempt did not complete within the configured timeout.
    #[error("[{transport}] timeout after {timeout_secs}s fetching {url}")]
    Timeout {
        /// Transport that issued the request.
        transport: String,
        /// Redacted target URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },

    /// Non-success HTTP status.
    #[error("[{transport}] HTTP {status} fetching {url}")]
    HttpStatus {
        /// Transport that issued the request.
        transport: String,
        /// Redacted target URL.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// The wrap proxy answered without a usable `contents` field.
    #[error("[{transport}] malformed proxy envelope for {url}: {reason}")]
    MalformedEnvelope {
        /// Transport that issued the request.
        transport: String,
        /// Redacted target URL.
        url: String,
        /// What was wrong with the envelope.
        reason: String,
    },

    /// The payload was not valid JSON.
    #[error("[{transport}] invalid JSON from {url}: {source}")]
    InvalidJson {
        /// Transport that issued the request.
        transport: String,
        /// Redacted target URL.
        url: String,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Every transport in the chain failed; wraps the last attempt's error.
    #[error("all {attempts} transports failed; last error: {last}")]
    Exhausted {
        /// Number of transports attempted.
        attempts: usize,
        /// Error from the final attempt.
        #[source]
        last: Box<FetchError>,
    },

    /// The fetcher was asked to fetch with an empty transport chain.
    #[error(
        "no transports configured for {url}\n  Suggestion: set `transports = \"wrap,passthrough,direct\"` in the config file"
    )]
    NoTransports {
        /// Redacted target URL.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error, classifying client timeouts as [`FetchError::Timeout`].
    pub fn from_reqwest(
        transport: &str,
        url: impl Into<String>,
        timeout_secs: u64,
        source: reqwest::Error,
    ) -> Self {
        // reqwest embeds the full request URL, keys included, in its message.
        let source = source.without_url();
        if source.is_timeout() {
            Self::Timeout {
                transport: transport.to_string(),
                url: url.into(),
                timeout_secs,
            }
        } else {
            Self::Network {
                transport: transport.to_string(),
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(transport: &str, url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            transport: transport.to_string(),
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed envelope error.
    pub fn malformed_envelope(
        transport: &str,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedEnvelope {
            transport: transport.to_string(),
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid JSON error.
    pub fn invalid_json(transport: &str, url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            transport: transport.to_string(),
            url: url.into(),
            source,
        }
    }

    /// Returns the transport name that produced this error, if any.
    #[must_use]
    pub fn transport(&self) -> Option<&str> {
        match self {
            Self::Network { transport, .. }
            | Self::Timeout { transport, .. }
            | Self::HttpStatus { transport, .. }
            | Self::MalformedEnvelope { transport, .. }
            | Self::InvalidJson { transport, .. } => Some(transport),
            Self::Exhausted { last, .. } => last.transport(),
            Self::ClientBuild { .. } | Self::NoTransports { .. } => None,
        }
    }

    /// Returns the error of the attempt that ended the chain.
    ///
    /// For [`FetchError::Exhausted`] this is the wrapped last error; any
    /// other variant is returned as-is.
    #[must_use]
    pub fn last_attempt(&self) -> &FetchError {
        match self {
            Self::Exhausted { last, .. } => last.last_attempt(),
            other => other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_names_transport_and_status() {
        let err = FetchError::http_status("direct", "https://example.com/api/items", 502);
        let msg = err.to_string();
        assert!(msg.contains("[direct]"), "should name transport: {msg}");
        assert!(msg.contains("502"), "should contain status: {msg}");
        assert_eq!(err.transport(), Some("direct"));
    }

    #[test]
    fn test_malformed_envelope_message_contains_reason() {
        let err = FetchError::malformed_envelope("wrap", "https://x", "missing `contents` field");
        assert!(err.to_string().contains("missing `contents` field"));
    }

    #[test]
    fn test_invalid_json_message() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = FetchError::invalid_json("passthrough", "https://x", source);
        assert!(err.to_string().contains("invalid JSON"));
        assert_eq!(err.transport(), Some("passthrough"));
    }

    #[test]
    fn test_exhausted_preserves_last_message() {
        let last = FetchError::http_status("direct", "https://x", 503);
        let last_msg = last.to_string();
        let err = FetchError::Exhausted {
            attempts: 3,
            last: Box::new(last),
        };
        assert!(err.to_string().contains(&last_msg));
        assert_eq!(err.transport(), Some("direct"));
        assert!(matches!(
            err.last_attempt(),
            FetchError::HttpStatus { status: 503, .. }
        ));
    }

    #[test]
    fn test_no_transports_has_suggestion() {
        let err = FetchError::NoTransports {
            url: "https://x".to_string(),
        };
        assert!(err.to_string().contains("Suggestion"));
        assert_eq!(err.transport(), None);
    }
}
