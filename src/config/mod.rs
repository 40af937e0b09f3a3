//! Configuration layering: CLI flags, environment, config file, defaults.
//!
//! Access keys only come from the environment. Everything else may also be
//! set in the config file; a CLI flag beats the environment, which beats the
//! file, which beats the built-in default.

mod error;
mod file;

pub use error::ConfigError;
pub use file::{
    FileConfig, LoadedConfig, load_config_file, parse_config_str, resolve_default_config_path,
};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::fetch::FetchSettings;
use crate::record::DateLocale;

/// Environment variable for the API base URL.
pub const ENV_API_BASE_URL: &str = "CULTURE_READ_API_BASE_URL";
/// Environment variable for the identity key.
pub const ENV_KEY_IDENTITY: &str = "CULTURE_READ_KEY_IDENTITY";
/// Environment variable for the credential key.
pub const ENV_KEY_CREDENTIAL: &str = "CULTURE_READ_KEY_CREDENTIAL";

const LEGACY_API_BASE_URL: &str = "REACT_APP_API_BASE_URL";
const LEGACY_KEY_IDENTITY: &str = "REACT_APP_API_KEY_IDENTITY";
const LEGACY_KEY_CREDENTIAL: &str = "REACT_APP_API_KEY_CREDENTIAL";

/// The two static access keys appended to every API request.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Value of `key_identity`.
    pub key_identity: String,
    /// Value of `key_credential`.
    pub key_credential: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key_identity", &"***")
            .field("key_credential", &"***")
            .finish()
    }
}

/// Repository endpoint and access keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without trailing slashes.
    pub base_url: String,
    /// Access keys.
    pub credentials: ApiCredentials,
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--api-base-url`
    pub api_base_url: Option<String>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
    /// `--date-locale`
    pub date_locale: Option<DateLocale>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Repository endpoint and keys.
    pub api: ApiConfig,
    /// Transport chain settings.
    pub fetch: FetchSettings,
    /// Locale for rendered dates.
    pub date_locale: DateLocale,
    /// Config file consulted, if any.
    pub config_path: Option<PathBuf>,
}

/// Reads a process environment variable.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First non-empty value among `names`.
fn first_non_empty<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
}

/// Reads the access keys.
///
/// # Errors
///
/// Returns [`ConfigError::MissingKeys`] naming every absent key.
pub fn credentials_from<F>(lookup: &F) -> Result<ApiCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let key_identity = first_non_empty(lookup, &[ENV_KEY_IDENTITY, LEGACY_KEY_IDENTITY]);
    let key_credential = first_non_empty(lookup, &[ENV_KEY_CREDENTIAL, LEGACY_KEY_CREDENTIAL]);

    match (key_identity, key_credential) {
        (Some(key_identity), Some(key_credential)) => Ok(ApiCredentials {
            key_identity,
            key_credential,
        }),
        (identity, credential) => {
            let mut missing = Vec::new();
            if identity.is_none() {
                missing.push(ENV_KEY_IDENTITY);
            }
            if credential.is_none() {
                missing.push(ENV_KEY_CREDENTIAL);
            }
            Err(ConfigError::MissingKeys { missing })
        }
    }
}

/// Strips trailing slashes and checks the URL is absolute http(s).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when `raw` is not an http(s) URL.
pub fn normalize_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(trimmed.to_string())
}

/// Merges CLI overrides, environment and file settings.
///
/// Keys are checked first so a missing key fails before anything else is
/// validated.
///
/// # Errors
///
/// Returns a [`ConfigError`] for missing keys, a missing base URL or an
/// invalid URL.
pub fn resolve<F>(
    overrides: &ConfigOverrides,
    loaded: &LoadedConfig,
    lookup: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = credentials_from(&lookup)?;
    let file = loaded.config.clone().unwrap_or_default();

    let raw_base_url = overrides
        .api_base_url
        .clone()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| first_non_empty(&lookup, &[ENV_API_BASE_URL, LEGACY_API_BASE_URL]))
        .or(file.api_base_url)
        .ok_or(ConfigError::MissingBaseUrl)?;
    let base_url = normalize_base_url("api_base_url", &raw_base_url)?;

    let mut fetch = FetchSettings::default();
    if let Some(secs) = overrides.timeout_secs.or(file.timeout_secs) {
        fetch.timeout = Duration::from_secs(secs);
    }
    if let Some(order) = file.transports {
        fetch.order = order;
    }
    if let Some(wrap) = file.wrap_proxy_url {
        fetch.wrap_proxy_url = normalize_base_url("wrap_proxy_url", &wrap)?;
    }
    if let Some(passthrough) = file.passthrough_proxy_url {
        fetch.passthrough_proxy_url =
            normalize_base_url("passthrough_proxy_url", &passthrough)?;
    }

    let date_locale = overrides
        .date_locale
        .or(file.date_locale)
        .unwrap_or_default();

    debug!(
        base_url = %base_url,
        timeout_secs = fetch.timeout.as_secs(),
        transports = ?fetch.order,
        date_locale = %date_locale,
        from_file = loaded.loaded_from_file(),
        "Configuration resolved"
    );

    Ok(ResolvedConfig {
        api: ApiConfig {
            base_url,
            credentials,
        },
        fetch,
        date_locale,
        config_path: loaded.path.clone(),
    })
}
