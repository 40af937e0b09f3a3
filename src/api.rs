//! Repository API endpoints, with access keys attached to every request.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::fetch::{FetchError, ResilientFetcher, redact_credentials};
use crate::record::Record;

/// Item listing path.
pub const ITEMS_PATH: &str = "/items";
/// Media detail path prefix.
pub const MEDIA_PATH: &str = "/media";

/// Appends the access-key query parameters to `url`.
///
/// Uses `&` if the URL already has a query string, else `?`.
#[must_use]
pub fn with_keys(url: &str, key_identity: &str, key_credential: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}key_identity={key_identity}&key_credential={key_credential}")
}

/// Joins `path` onto `base_url`, inserting a leading slash when missing.
#[must_use]
pub fn join_path(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// Client for the repository's item and media endpoints.
#[derive(Debug)]
pub struct CatalogApi {
    config: ApiConfig,
    fetcher: ResilientFetcher,
}

impl CatalogApi {
    /// Creates a client that fetches through `fetcher`.
    #[must_use]
    pub fn new(config: ApiConfig, fetcher: ResilientFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Base URL without trailing slashes.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fully-qualified URL for `path`, keys included.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let credentials = &self.config.credentials;
        with_keys(
            &join_path(&self.config.base_url, path),
            &credentials.key_identity,
            &credentials.key_credential,
        )
    }

    /// Fetches the full item listing.
    ///
    /// A payload that is not an array yields no records.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when every transport fails.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Record>, FetchError> {
        let url = self.endpoint(ITEMS_PATH);
        let payload = self.fetcher.fetch(&url).await?;
        let records = Record::from_listing(payload);
        debug!(count = records.len(), "Item listing fetched");
        Ok(records)
    }

    /// Fetches one media record.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when every transport fails.
    #[instrument(skip(self))]
    pub async fn media(&self, media_id: &str) -> Result<Value, FetchError> {
        let url = self.endpoint(&format!("{MEDIA_PATH}/{media_id}"));
        debug!(url = %redact_credentials(&url), "Fetching media record");
        self.fetcher.fetch(&url).await
    }
}
