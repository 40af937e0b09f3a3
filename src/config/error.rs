//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or resolving configuration.
///
/// All of these are detected before any network request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or both access keys are absent.
    #[error(
        "API keys not found. Missing: {}\n  Suggestion: export CULTURE_READ_KEY_IDENTITY and CULTURE_READ_KEY_CREDENTIAL (or the REACT_APP_API_KEY_* names)",
        missing.join(", ")
    )]
    MissingKeys {
        /// Names of the missing settings.
        missing: Vec<&'static str>,
    },

    /// No API base URL from flag, environment or file.
    #[error(
        "API base URL not configured\n  Suggestion: export CULTURE_READ_API_BASE_URL, set `api_base_url` in the config file, or pass --api-base-url"
    )]
    MissingBaseUrl,

    /// A URL setting is not an absolute http(s) URL.
    #[error("invalid URL for `{key}`: '{value}' ({reason})")]
    InvalidUrl {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The config file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file '{}' does not exist", path.display())]
    NotFound {
        /// File path.
        path: PathBuf,
    },

    /// A line is not of the form `key = value`.
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax {
        /// 1-based line number.
        line: usize,
    },

    /// A key is not recognised.
    #[error("unknown configuration key: '{key}' on line {line}")]
    UnknownKey {
        /// Key as written.
        key: String,
        /// 1-based line number.
        line: usize,
    },

    /// A value could not be parsed for its key.
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A value is outside its accepted range.
    #[error("invalid config value for `{key}`: {value}. Expected range: {expected}")]
    OutOfRange {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: u64,
        /// Accepted range.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_message() {
        let err = ConfigError::MissingKeys {
            missing: vec!["key_identity", "key_credential"],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("API keys not found"), "{msg}");
        assert!(msg.contains("key_identity, key_credential"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_unknown_key_names_line() {
        let err = ConfigError::UnknownKey {
            key: "colour".into(),
            line: 4,
        };
        assert_eq!(err.to_string(), "unknown configuration key: 'colour' on line 4");
    }
}
