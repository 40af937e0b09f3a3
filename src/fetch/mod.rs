//! Resilient JSON fetching through an ordered chain of transports.
//!
//! The upstream repository may not allow cross-origin access, so a target URL
//! is tried through public proxies before a direct request. Each transport is
//! attempted once, in order, and the first success wins.
//!
//! # Architecture
//!
//! - [`Transport`] - Async trait implemented by each delivery option
//! - [`ResilientFetcher`] - Ordered transport chain with the fallback loop
//! - [`WrapProxyTransport`] - Proxy returning `{ "contents": ... }`
//! - [`PassthroughProxyTransport`] - Proxy relaying the raw body
//! - [`DirectTransport`] - Plain request to the target
//!
//! # Example
//!
//! ```no_run
//! use culture_read_core::fetch::{FetchSettings, build_fetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = build_fetcher(&FetchSettings::default())?;
//! let items = fetcher
//!     .fetch("https://lib.example.org/api/items?key_identity=a&key_credential=b")
//!     .await?;
//! println!("{items}");
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod transport;

pub use error::FetchError;
pub use http_client::build_http_client;
pub use transport::{
    DEFAULT_PASSTHROUGH_PROXY_URL, DEFAULT_WRAP_PROXY_URL, DirectTransport,
    PASSTHROUGH_PROXY_PARAM, PassthroughProxyTransport, WRAP_PROXY_PARAM, WrapProxyTransport,
    proxied_url,
};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

/// Per-attempt timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Query parameters whose values are replaced before a URL is logged or displayed.
const CREDENTIAL_PARAMS: [&str; 2] = ["key_identity", "key_credential"];

/// One way of delivering a URL's content as JSON.
///
/// # Object Safety
///
/// Uses `async_trait` so the chain can hold `Box<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the transport's name (e.g. "wrap", "passthrough", "direct").
    fn name(&self) -> &str;

    /// Makes exactly one attempt to retrieve `target_url` as JSON.
    async fn attempt(&self, target_url: &str) -> Result<Value, FetchError>;
}

/// Built-in transport options, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Fetch-and-wrap proxy.
    Wrap,
    /// Passthrough proxy.
    Passthrough,
    /// Direct request.
    Direct,
}

impl TransportKind {
    /// Default chain: both proxies before the direct request.
    pub const DEFAULT_ORDER: [TransportKind; 3] = [Self::Wrap, Self::Passthrough, Self::Direct];

    /// Returns the configuration label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrap => "wrap",
            Self::Passthrough => "passthrough",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wrap" => Ok(Self::Wrap),
            "passthrough" => Ok(Self::Passthrough),
            "direct" => Ok(Self::Direct),
            other => Err(format!(
                "unknown transport '{other}' (expected wrap, passthrough or direct)"
            )),
        }
    }
}

/// Settings used to assemble the default transport chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Timeout applied to every attempt.
    pub timeout: Duration,
    /// Transports in the order they are tried.
    pub order: Vec<TransportKind>,
    /// Wrap proxy endpoint.
    pub wrap_proxy_url: String,
    /// Passthrough proxy endpoint.
    pub passthrough_proxy_url: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            order: TransportKind::DEFAULT_ORDER.to_vec(),
            wrap_proxy_url: DEFAULT_WRAP_PROXY_URL.to_string(),
            passthrough_proxy_url: DEFAULT_PASSTHROUGH_PROXY_URL.to_string(),
        }
    }
}

/// Builds a fetcher whose chain follows `settings.order`, sharing one HTTP client.
///
/// # Errors
///
/// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be constructed.
pub fn build_fetcher(settings: &FetchSettings) -> Result<ResilientFetcher, FetchError> {
    let client = build_http_client(settings.timeout)?;
    let timeout_secs = settings.timeout.as_secs();
    let mut fetcher = ResilientFetcher::new();

    for kind in &settings.order {
        let transport: Box<dyn Transport> = match kind {
            TransportKind::Wrap => Box::new(WrapProxyTransport::new(
                client.clone(),
                settings.wrap_proxy_url.clone(),
                timeout_secs,
            )),
            TransportKind::Passthrough => Box::new(PassthroughProxyTransport::new(
                client.clone(),
                settings.passthrough_proxy_url.clone(),
                timeout_secs,
            )),
            TransportKind::Direct => Box::new(DirectTransport::new(client.clone(), timeout_secs)),
        };
        fetcher.register(transport);
    }

    Ok(fetcher)
}

/// An ordered chain of transports with a sequential fallback loop.
pub struct ResilientFetcher {
    transports: Vec<Box<dyn Transport>>,
}

impl ResilientFetcher {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transports: Vec::new(),
        }
    }

    /// Appends a transport to the end of the chain.
    pub fn register(&mut self, transport: Box<dyn Transport>) {
        debug!(
            name = transport.name(),
            position = self.transports.len(),
            "Registering transport"
        );
        self.transports.push(transport);
    }

    /// Returns the number of transports in the chain.
    #[must_use]
    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    /// Returns the transport names in attempt order.
    #[must_use]
    pub fn transport_names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Fetches `target_url` as JSON.
    ///
    /// Transports are attempted strictly one after another; the first success
    /// is returned and later transports are never contacted. Failures are not
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Exhausted`] wrapping the last transport's error
    /// when every transport fails, or [`FetchError::NoTransports`] for an
    /// empty chain.
    #[tracing::instrument(skip(self, target_url), fields(url = %redact_credentials(target_url)))]
    pub async fn fetch(&self, target_url: &str) -> Result<Value, FetchError> {
        let mut last_error = None;

        for (position, transport) in self.transports.iter().enumerate() {
            debug!(transport = transport.name(), position, "Trying transport");
            match transport.attempt(target_url).await {
                Ok(payload) => {
                    info!(transport = transport.name(), "Fetch successful");
                    return Ok(payload);
                }
                Err(error) => {
                    warn!(
                        transport = transport.name(),
                        error = %error,
                        "Transport failed, trying next"
                    );
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) => {
                warn!(tried = self.transports.len(), "All transports failed");
                Err(FetchError::Exhausted {
                    attempts: self.transports.len(),
                    last: Box::new(error),
                })
            }
            None => Err(FetchError::NoTransports {
                url: redact_credentials(target_url),
            }),
        }
    }
}

impl fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("transport_count", &self.transports.len())
            .field("transports", &self.transport_names())
            .finish()
    }
}

impl Default for ResilientFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces access-key query values with `***` for logs and messages.
///
/// Unparseable input is returned without its query string.
#[must_use]
pub fn redact_credentials(raw_url: &str) -> String {
    let Ok(mut url) = Url::parse(raw_url) else {
        return raw_url
            .split_once('?')
            .map_or_else(|| raw_url.to_string(), |(base, _)| base.to_string());
    };

    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if CREDENTIAL_PARAMS.contains(&key.as_ref()) {
                (key.into_owned(), "***".to_string())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    // ==================== MockTransport for Testing ====================

    struct MockTransport {
        mock_name: &'static str,
        payload: Option<Value>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &str {
            self.mock_name
        }

        async fn attempt(&self, target_url: &str) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payload
                .clone()
                .ok_or_else(|| FetchError::http_status(self.mock_name, target_url, 503))
        }
    }

    fn mock(name: &'static str, payload: Option<Value>) -> (Box<dyn Transport>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = MockTransport {
            mock_name: name,
            payload,
            calls: Arc::clone(&calls),
        };
        (Box::new(transport), calls)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits_chain() {
        let (first, first_calls) = mock("wrap", Some(json!([1])));
        let (second, second_calls) = mock("passthrough", Some(json!([2])));
        let (third, third_calls) = mock("direct", Some(json!([3])));
        let mut fetcher = ResilientFetcher::new();
        fetcher.register(first);
        fetcher.register(second);
        fetcher.register(third);

        let payload = fetcher.fetch("https://x.org/api/items").await.unwrap();

        assert_eq!(payload, json!([1]));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let (first, first_calls) = mock("wrap", None);
        let (second, second_calls) = mock("passthrough", Some(json!({"ok": true})));
        let (third, third_calls) = mock("direct", Some(json!([3])));
        let mut fetcher = ResilientFetcher::new();
        fetcher.register(first);
        fetcher.register(second);
        fetcher.register(third);

        let payload = fetcher.fetch("https://x.org/").await.unwrap();

        assert_eq!(payload, json!({"ok": true}));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_all_fail() {
        let (first, _) = mock("wrap", None);
        let (second, _) = mock("passthrough", None);
        let (third, third_calls) = mock("direct", None);
        let mut fetcher = ResilientFetcher::new();
        fetcher.register(first);
        fetcher.register(second);
        fetcher.register(third);

        let err = fetcher.fetch("https://x.org/").await.unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }));
        assert_eq!(err.transport(), Some("direct"));
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_is_an_error() {
        let fetcher = ResilientFetcher::new();
        let err = fetcher.fetch("https://x.org/").await.unwrap_err();
        assert!(matches!(err, FetchError::NoTransports { .. }));
    }

    #[test]
    fn test_build_fetcher_follows_configured_order() {
        let settings = FetchSettings {
            order: vec![TransportKind::Direct, TransportKind::Wrap],
            ..FetchSettings::default()
        };
        let fetcher = build_fetcher(&settings).unwrap();
        assert_eq!(fetcher.transport_names(), vec!["direct", "wrap"]);
    }

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert_eq!(
            settings.order,
            vec![
                TransportKind::Wrap,
                TransportKind::Passthrough,
                TransportKind::Direct
            ]
        );
    }

    #[test]
    fn test_transport_kind_parse() {
        assert_eq!("Wrap".parse::<TransportKind>(), Ok(TransportKind::Wrap));
        assert_eq!(" direct ".parse::<TransportKind>(), Ok(TransportKind::Direct));
        assert!("ftp".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_debug_lists_transport_names() {
        let (first, _) = mock("wrap", None);
        let mut fetcher = ResilientFetcher::new();
        fetcher.register(first);
        let debug_str = format!("{fetcher:?}");
        assert!(debug_str.contains("wrap"));
        assert!(debug_str.contains("transport_count: 1"));
    }

    #[test]
    fn test_redact_credentials_hides_keys() {
        let redacted = redact_credentials(
            "https://lib.example.org/api/items?page=2&key_identity=abc&key_credential=secret",
        );
        assert!(!redacted.contains("abc"), "{redacted}");
        assert!(!redacted.contains("secret"), "{redacted}");
        assert!(redacted.contains("page=2"));
        assert!(redacted.contains("key_identity="));
    }

    #[test]
    fn test_redact_credentials_without_query() {
        assert_eq!(
            redact_credentials("https://lib.example.org/api/items"),
            "https://lib.example.org/api/items"
        );
    }

    #[test]
    fn test_redact_credentials_unparseable_drops_query() {
        assert_eq!(redact_credentials("not a url?key_credential=s"), "not a url");
    }
}
