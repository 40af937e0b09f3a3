//! Flat `key = value` config file parsing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ConfigError;
use crate::fetch::TransportKind;
use crate::record::DateLocale;

/// Accepted range for `timeout_secs`.
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Optional settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Repository API base URL.
    pub api_base_url: Option<String>,
    /// Per-attempt timeout in seconds (1..=300).
    pub timeout_secs: Option<u64>,
    /// Transport order.
    pub transports: Option<Vec<TransportKind>>,
    /// Wrap proxy endpoint.
    pub wrap_proxy_url: Option<String>,
    /// Passthrough proxy endpoint.
    pub passthrough_proxy_url: Option<String>,
    /// Locale for rendered dates.
    pub date_locale: Option<DateLocale>,
}

impl FileConfig {
    /// Validates values against their accepted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for an out-of-range timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.timeout_secs
            && !TIMEOUT_RANGE.contains(&timeout)
        {
            return Err(ConfigError::OutOfRange {
                key: "timeout_secs",
                value: timeout,
                expected: "1..=300",
            });
        }
        Ok(())
    }
}

/// Config file metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Path consulted, if one could be determined.
    pub path: Option<PathBuf>,
    /// Parsed settings when the file existed.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Whether settings were read from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves the default config path from an environment lookup.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/culture-read/config.toml`
/// 2. `$HOME/.config/culture-read/config.toml`
#[must_use]
pub fn resolve_default_config_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(xdg_config_home) = non_empty("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("culture-read")
                .join("config.toml"),
        );
    }

    let home = non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("culture-read")
            .join("config.toml"),
    )
}

/// Loads the config file.
///
/// An `explicit` path must exist. Otherwise the default path is used and a
/// missing file simply yields no settings.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or an
/// explicit path does not exist.
pub fn load_config_file<F>(explicit: Option<&Path>, lookup: F) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(read_file_config(path)?),
        });
    }

    let path = resolve_default_config_path(lookup);
    let config = match path.as_deref() {
        Some(path) if path.exists() => Some(read_file_config(path)?),
        Some(path) => {
            debug!(path = %path.display(), "No config file; using defaults");
            None
        }
        None => None,
    };
    Ok(LoadedConfig { path, config })
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_str(&raw)?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Parses config text.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the offending line for malformed lines,
/// unknown keys and unparseable values.
pub fn parse_config_str(raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();

    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_number });
        };
        let value = raw_value.trim();

        match raw_key.trim() {
            "api_base_url" => {
                cfg.api_base_url = Some(string_value("api_base_url", value, line_number)?);
            }
            "timeout_secs" => {
                cfg.timeout_secs = Some(parse_integer_u64(value).map_err(|reason| {
                    ConfigError::InvalidValue {
                        key: "timeout_secs",
                        line: line_number,
                        reason,
                    }
                })?);
            }
            "transports" => {
                let parsed = string_value("transports", value, line_number)?;
                cfg.transports = Some(parse_transport_order(&parsed).map_err(|reason| {
                    ConfigError::InvalidValue {
                        key: "transports",
                        line: line_number,
                        reason,
                    }
                })?);
            }
            "wrap_proxy_url" => {
                cfg.wrap_proxy_url = Some(string_value("wrap_proxy_url", value, line_number)?);
            }
            "passthrough_proxy_url" => {
                cfg.passthrough_proxy_url =
                    Some(string_value("passthrough_proxy_url", value, line_number)?);
            }
            "date_locale" => {
                let parsed = string_value("date_locale", value, line_number)?;
                cfg.date_locale = Some(parsed.parse().map_err(|reason| {
                    ConfigError::InvalidValue {
                        key: "date_locale",
                        line: line_number,
                        reason,
                    }
                })?);
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_number,
                });
            }
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Parses a comma-separated transport list; order is kept, duplicates rejected.
pub(crate) fn parse_transport_order(raw: &str) -> Result<Vec<TransportKind>, String> {
    let mut order = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let kind: TransportKind = token.parse()?;
        if order.contains(&kind) {
            return Err(format!("transport '{kind}' listed more than once"));
        }
        order.push(kind);
    }
    if order.is_empty() {
        return Err("expected at least one transport".to_string());
    }
    Ok(order)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn string_value(key: &'static str, raw: &str, line: usize) -> Result<String, ConfigError> {
    parse_string_literal(raw).map_err(|reason| ConfigError::InvalidValue { key, line, reason })
}

fn parse_string_literal(raw_value: &str) -> Result<String, String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return Err("expected double-quoted string".to_string());
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64, String> {
    let token = raw_value.trim();
    if token.is_empty() {
        return Err("expected integer value".to_string());
    }
    token
        .parse::<u64>()
        .map_err(|e| format!("expected non-negative integer ({e})"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config_str(
            r#"
# repository
api_base_url = "https://lib.example.org/api"
timeout_secs = 20 # per attempt
transports = "direct, wrap"
wrap_proxy_url = "https://wrap.example.net/get"
passthrough_proxy_url = "https://pass.example.net/proxy"
date_locale = "en"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://lib.example.org/api"));
        assert_eq!(cfg.timeout_secs, Some(20));
        assert_eq!(
            cfg.transports,
            Some(vec![TransportKind::Direct, TransportKind::Wrap])
        );
        assert_eq!(cfg.date_locale, Some(DateLocale::English));
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let cfg = parse_config_str(r#"api_base_url = "https://x.org/api#frag""#).unwrap();
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://x.org/api#frag"));
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = parse_config_str("\ncolour = \"red\"").expect_err("unknown key");
        assert!(matches!(err, ConfigError::UnknownKey { line: 2, .. }));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_rejects_line_without_equals() {
        let err = parse_config_str("timeout_secs 20").expect_err("syntax error");
        assert!(matches!(err, ConfigError::Syntax { line: 1 }));
    }

    #[test]
    fn test_rejects_timeout_out_of_range() {
        let err = parse_config_str("timeout_secs = 0").expect_err("range error");
        assert!(err.to_string().contains("timeout_secs"));
        assert!(parse_config_str("timeout_secs = 301").is_err());
        assert!(parse_config_str("timeout_secs = 300").is_ok());
    }

    #[test]
    fn test_rejects_trailing_tokens() {
        let err = parse_config_str("timeout_secs = 4 seconds").expect_err("trailing tokens");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_unquoted_string() {
        let err = parse_config_str("api_base_url = https://x.org").expect_err("unquoted");
        assert!(err.to_string().contains("double-quoted"));
    }

    #[test]
    fn test_transport_order_rules() {
        assert!(parse_transport_order("wrap,wrap").is_err());
        assert!(parse_transport_order("carrier-pigeon").is_err());
        assert!(parse_transport_order(" , ").is_err());
        assert_eq!(
            parse_transport_order("passthrough").unwrap(),
            vec![TransportKind::Passthrough]
        );
    }

    #[test]
    fn test_default_path_prefers_xdg() {
        let env: HashMap<&str, &str> =
            HashMap::from([("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/reader")]);
        let path = resolve_default_config_path(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(path, Some(PathBuf::from("/xdg/culture-read/config.toml")));

        let path = resolve_default_config_path(|k| {
            (k == "HOME").then(|| "/home/reader".to_string())
        });
        assert_eq!(
            path,
            Some(PathBuf::from("/home/reader/.config/culture-read/config.toml"))
        );

        assert_eq!(resolve_default_config_path(|_| None), None);
    }

    #[test]
    fn test_load_missing_default_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let loaded = load_config_file(None, |k| (k == "XDG_CONFIG_HOME").then(|| root.clone()))
            .expect("missing file is fine");
        assert!(!loaded.loaded_from_file());
        assert!(loaded.path.is_some());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "date_locale = \"th\"\n").unwrap();

        let loaded = load_config_file(Some(&path), |_| None).unwrap();
        assert_eq!(
            loaded.config.and_then(|c| c.date_locale),
            Some(DateLocale::Thai)
        );

        let missing = dir.path().join("absent.toml");
        let err = load_config_file(Some(&missing), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
