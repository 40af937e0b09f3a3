//! Concrete transport options: wrap proxy, passthrough proxy and direct.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{FetchError, Transport, redact_credentials};

/// Default "fetch-and-wrap" proxy endpoint; returns `{ "contents": ... }`.
pub const DEFAULT_WRAP_PROXY_URL: &str = "https://api.allorigins.win/get";

/// Query parameter the wrap proxy reads the target URL from.
pub const WRAP_PROXY_PARAM: &str = "url";

/// Default passthrough proxy endpoint; returns the raw target body.
pub const DEFAULT_PASSTHROUGH_PROXY_URL: &str = "https://api.codetabs.com/v1/proxy";

/// Query parameter the passthrough proxy reads the target URL from.
pub const PASSTHROUGH_PROXY_PARAM: &str = "quest";

/// Builds `<endpoint>?<param>=<encoded target>`, percent-encoding the target
/// the way `encodeURIComponent` does.
#[must_use]
pub fn proxied_url(endpoint: &str, param: &str, target_url: &str) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{endpoint}{sep}{param}={}",
        urlencoding::encode(target_url)
    )
}

/// Issues a GET and returns the body of a successful response.
async fn get_body(
    client: &Client,
    transport: &str,
    request_url: &str,
    target_url: &str,
    timeout_secs: u64,
) -> Result<String, FetchError> {
    let display_url = redact_credentials(target_url);
    let response = client
        .get(request_url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(transport, display_url.clone(), timeout_secs, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::http_status(
            transport,
            display_url,
            status.as_u16(),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(transport, display_url, timeout_secs, e))
}

fn parse_json(transport: &str, target_url: &str, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::invalid_json(transport, redact_credentials(target_url), e))
}

/// Proxy that fetches the target and embeds its body in a JSON envelope.
#[derive(Debug, Clone)]
pub struct WrapProxyTransport {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl WrapProxyTransport {
    /// Creates a wrap proxy transport for `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        }
    }

    /// Extracts the target payload from a parsed envelope.
    ///
    /// A string `contents` holds the raw target body and is parsed as JSON;
    /// any other non-null value is already the payload.
    fn unwrap_envelope(&self, target_url: &str, envelope: Value) -> Result<Value, FetchError> {
        let name = self.name();
        let Value::Object(mut fields) = envelope else {
            return Err(FetchError::malformed_envelope(
                name,
                redact_credentials(target_url),
                "envelope is not a JSON object",
            ));
        };

        match fields.remove("contents") {
            Some(Value::String(raw)) => parse_json(name, target_url, &raw),
            Some(Value::Null) | None => Err(FetchError::malformed_envelope(
                name,
                redact_credentials(target_url),
                "missing `contents` field",
            )),
            Some(payload) => Ok(payload),
        }
    }
}

#[async_trait]
impl Transport for WrapProxyTransport {
    fn name(&self) -> &'static str {
        "wrap"
    }

    #[tracing::instrument(skip_all, fields(transport = "wrap"))]
    async fn attempt(&self, target_url: &str) -> Result<Value, FetchError> {
        let request_url = proxied_url(&self.endpoint, WRAP_PROXY_PARAM, target_url);
        debug!(endpoint = %self.endpoint, "Requesting through wrap proxy");
        let body = get_body(
            &self.client,
            self.name(),
            &request_url,
            target_url,
            self.timeout_secs,
        )
        .await?;
        let envelope = parse_json(self.name(), target_url, &body)?;
        self.unwrap_envelope(target_url, envelope)
    }
}

/// Proxy that relays the target body unchanged.
///
/// A 2xx body that is not JSON (an HTML rate-limit page, say) is a failure,
/// so the chain moves on instead of treating it as an empty listing.
#[derive(Debug, Clone)]
pub struct PassthroughProxyTransport {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl PassthroughProxyTransport {
    /// Creates a passthrough proxy transport for `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl Transport for PassthroughProxyTransport {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    #[tracing::instrument(skip_all, fields(transport = "passthrough"))]
    async fn attempt(&self, target_url: &str) -> Result<Value, FetchError> {
        let request_url = proxied_url(&self.endpoint, PASSTHROUGH_PROXY_PARAM, target_url);
        debug!(endpoint = %self.endpoint, "Requesting through passthrough proxy");
        let body = get_body(
            &self.client,
            self.name(),
            &request_url,
            target_url,
            self.timeout_secs,
        )
        .await?;
        parse_json(self.name(), target_url, &body)
    }
}

/// Plain request to the target URL; the last resort in the default chain.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: Client,
    timeout_secs: u64,
}

impl DirectTransport {
    /// Creates a direct transport.
    #[must_use]
    pub fn new(client: Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn name(&self) -> &'static str {
        "direct"
    }

    #[tracing::instrument(skip_all, fields(transport = "direct"))]
    async fn attempt(&self, target_url: &str) -> Result<Value, FetchError> {
        let body = get_body(
            &self.client,
            self.name(),
            target_url,
            target_url,
            self.timeout_secs,
        )
        .await?;
        parse_json(self.name(), target_url, &body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::fetch::build_http_client;

    fn wrap() -> WrapProxyTransport {
        let client = build_http_client(Duration::from_secs(15)).unwrap();
        WrapProxyTransport::new(client, DEFAULT_WRAP_PROXY_URL, 15)
    }

    #[test]
    fn test_proxied_url_encodes_like_encode_uri_component() {
        let url = proxied_url(
            "https://api.allorigins.win/get",
            "url",
            "https://lib.example.org/api/items?key_identity=a&key_credential=b",
        );
        assert_eq!(
            url,
            "https://api.allorigins.win/get?url=https%3A%2F%2Flib.example.org%2Fapi%2Fitems%3Fkey_identity%3Da%26key_credential%3Db"
        );
    }

    #[test]
    fn test_proxied_url_appends_to_existing_query() {
        let url = proxied_url("https://proxy.example/p?v=1", "quest", "https://x.org/");
        assert!(url.starts_with("https://proxy.example/p?v=1&quest="));
    }

    #[test]
    fn test_unwrap_envelope_parses_string_contents() {
        let envelope = json!({ "contents": "[{\"o:id\":1}]", "status": { "http_code": 200 } });
        let payload = wrap().unwrap_envelope("https://x.org/api/items", envelope).unwrap();
        assert_eq!(payload, json!([{ "o:id": 1 }]));
    }

    #[test]
    fn test_unwrap_envelope_accepts_embedded_json() {
        let envelope = json!({ "contents": { "o:original_url": "https://x.org/f.pdf" } });
        let payload = wrap().unwrap_envelope("https://x.org/api/media/3", envelope).unwrap();
        assert_eq!(payload["o:original_url"], "https://x.org/f.pdf");
    }

    #[test]
    fn test_unwrap_envelope_rejects_null_contents() {
        let err = wrap()
            .unwrap_envelope("https://x.org/", json!({ "contents": null }))
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_unwrap_envelope_rejects_non_object() {
        let err = wrap().unwrap_envelope("https://x.org/", json!([1, 2])).unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_unwrap_envelope_rejects_unparseable_contents() {
        let err = wrap()
            .unwrap_envelope("https://x.org/", json!({ "contents": "<html>blocked</html>" }))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson { .. }));
    }

    #[test]
    fn test_transport_names() {
        let client = build_http_client(Duration::from_secs(15)).unwrap();
        assert_eq!(wrap().name(), "wrap");
        assert_eq!(
            PassthroughProxyTransport::new(client.clone(), DEFAULT_PASSTHROUGH_PROXY_URL, 15)
                .name(),
            "passthrough"
        );
        assert_eq!(DirectTransport::new(client, 15).name(), "direct");
    }
}
