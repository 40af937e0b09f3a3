//! Creation-date parsing and long-form rendering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Rendered when a record has no creation date or it cannot be parsed.
pub const DATE_PLACEHOLDER: &str = "-";

/// Offset between the Gregorian and Thai Buddhist-era year numbering.
const BUDDHIST_ERA_OFFSET: i32 = 543;

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Locale used for long-form dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    /// `15 มกราคม 2567` (day, month name, Buddhist-era year).
    #[default]
    Thai,
    /// `January 15, 2024`.
    English,
}

impl DateLocale {
    /// Returns the configuration label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thai => "th",
            Self::English => "en",
        }
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "th" | "th-th" | "thai" => Ok(Self::Thai),
            "en" | "en-us" | "english" => Ok(Self::English),
            other => Err(format!("unsupported date locale '{other}' (expected th or en)")),
        }
    }
}

/// Parses an ISO timestamp into its calendar date.
///
/// Accepts RFC 3339 (`2024-01-15T08:30:00+07:00`), naive date-times and
/// plain dates. Timestamps with an offset keep the date in that offset.
#[must_use]
pub fn parse_created(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Renders a date in the locale's long format.
#[must_use]
pub fn format_long_date(date: NaiveDate, locale: DateLocale) -> String {
    let month_index = date.month0() as usize;
    match locale {
        DateLocale::Thai => format!(
            "{} {} {}",
            date.day(),
            THAI_MONTHS[month_index],
            date.year() + BUDDHIST_ERA_OFFSET
        ),
        DateLocale::English => format!(
            "{} {}, {}",
            ENGLISH_MONTHS[month_index],
            date.day(),
            date.year()
        ),
    }
}

/// Parses and renders `raw`, falling back to [`DATE_PLACEHOLDER`].
#[must_use]
pub fn display_created(raw: Option<&str>, locale: DateLocale) -> String {
    raw.and_then(parse_created)
        .map_or_else(|| DATE_PLACEHOLDER.to_string(), |d| format_long_date(d, locale))
}
