//! Catalog records and their field-resolution helpers.
//!
//! Records are kept as the raw JSON objects returned by the repository API;
//! every accessor here is total. Missing fields, wrong types and non-object
//! records all resolve to a displayable value instead of an error, so the
//! render path cannot fail on partially-populated metadata.

mod date;

pub use date::{DATE_PLACEHOLDER, DateLocale, display_created, format_long_date, parse_created};

use std::fmt;

use serde_json::Value;
use tracing::warn;

/// Title shown when a record carries neither title field ("untitled document").
pub const FALLBACK_TITLE: &str = "ไม่มีชื่อเอกสาร";

/// Label dimensions a record can be faceted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetDimension {
    /// Subject / document category (`dcterms:subject`).
    Category,
    /// Language (`dcterms:language`).
    Language,
    /// Source / holding institution (`dcterms:source`).
    Source,
}

impl FacetDimension {
    /// All dimensions in display order.
    pub const ALL: [FacetDimension; 3] = [Self::Category, Self::Language, Self::Source];

    /// Returns the record property holding this dimension's labels.
    #[must_use]
    pub fn property(self) -> &'static str {
        match self {
            Self::Category => "dcterms:subject",
            Self::Language => "dcterms:language",
            Self::Source => "dcterms:source",
        }
    }

    /// Returns a short human-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Language => "language",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for FacetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thumbnail variants exposed under `thumbnail_display_urls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSize {
    /// `large`
    Large,
    /// `medium`
    Medium,
    /// `square`
    Square,
}

impl ThumbnailSize {
    fn key(self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Square => "square",
        }
    }
}

/// Order in which thumbnail variants are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailPreference(pub [ThumbnailSize; 3]);

impl ThumbnailPreference {
    /// `large → medium → square`
    pub const LARGE_FIRST: Self = Self([
        ThumbnailSize::Large,
        ThumbnailSize::Medium,
        ThumbnailSize::Square,
    ]);

    /// `medium → large → square`
    pub const MEDIUM_FIRST: Self = Self([
        ThumbnailSize::Medium,
        ThumbnailSize::Large,
        ThumbnailSize::Square,
    ]);
}

impl Default for ThumbnailPreference {
    fn default() -> Self {
        Self::LARGE_FIRST
    }
}

/// One catalog entry as returned by the repository API.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    raw: Value,
}

impl Record {
    /// Wraps a raw API object.
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Converts an item-listing payload into records.
    ///
    /// A payload that is not an array is treated as an empty listing.
    #[must_use]
    pub fn from_listing(payload: Value) -> Vec<Self> {
        match payload {
            Value::Array(items) => items.into_iter().map(Self::new).collect(),
            other => {
                warn!(
                    kind = json_kind(&other),
                    "Item listing is not an array; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Returns the raw JSON object.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Returns the record identifier (`o:id`) as text.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.raw.get("o:id").and_then(identifier_text)
    }

    /// Resolves the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        non_empty_str(self.raw.get("o:title"))
            .or_else(|| first_value(&self.raw, "dcterms:title"))
            .unwrap_or(FALLBACK_TITLE)
    }

    /// Resolves the description, preferring the abstract.
    #[must_use]
    pub fn description(&self) -> &str {
        first_value(&self.raw, "dcterms:abstract")
            .or_else(|| first_value(&self.raw, "dcterms:description"))
            .unwrap_or("")
    }

    /// Resolves the thumbnail URL in the given preference order.
    #[must_use]
    pub fn thumbnail(&self, preference: ThumbnailPreference) -> Option<&str> {
        let urls = self.raw.get("thumbnail_display_urls")?;
        preference
            .0
            .iter()
            .find_map(|size| non_empty_str(urls.get(size.key())))
    }

    /// Returns the raw creation timestamp (`o:created.@value`).
    #[must_use]
    pub fn created_raw(&self) -> Option<&str> {
        non_empty_str(self.raw.get("o:created").and_then(|c| c.get("@value")))
    }

    /// Renders the creation date in the locale's long format, or `-`.
    #[must_use]
    pub fn created_display(&self, locale: DateLocale) -> String {
        display_created(self.created_raw(), locale)
    }

    /// Extracts this record's labels for `dimension`, in document order.
    ///
    /// Each entry contributes its `o:label`, else its `@value`; entries with
    /// neither are dropped.
    #[must_use]
    pub fn labels(&self, dimension: FacetDimension) -> Vec<&str> {
        let Some(Value::Array(entries)) = self.raw.get(dimension.property()) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| {
                non_empty_str(entry.get("o:label")).or_else(|| non_empty_str(entry.get("@value")))
            })
            .collect()
    }

    /// Returns the primary media identifier (`o:primary_media.o:id`), if any.
    #[must_use]
    pub fn primary_media_id(&self) -> Option<String> {
        self.raw
            .get("o:primary_media")
            .and_then(|media| media.get("o:id"))
            .and_then(identifier_text)
    }
}

impl From<Value> for Record {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

/// Reads the original-file URL (`o:original_url`) from a media payload.
#[must_use]
pub fn media_original_url(media: &Value) -> Option<&str> {
    non_empty_str(media.get("o:original_url"))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// First `@value` of a multi-valued property (`prop[0].@value`).
fn first_value<'a>(raw: &'a Value, property: &str) -> Option<&'a str> {
    non_empty_str(
        raw.get(property)
            .and_then(|values| values.get(0))
            .and_then(|first| first.get("@value")),
    )
}

/// Identifier as text; zero, empty strings and other types count as absent.
fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn full_record() -> Record {
        Record::new(json!({
            "o:id": 42,
            "o:title": "ตำรายาโบราณ",
            "dcterms:abstract": [{ "@value": "Herbal remedies" }],
            "dcterms:description": [{ "@value": "Unused description" }],
            "thumbnail_display_urls": {
                "large": "https://lib.example.org/thumb/large/42.jpg",
                "medium": "https://lib.example.org/thumb/medium/42.jpg",
                "square": "https://lib.example.org/thumb/square/42.jpg"
            },
            "o:created": { "@value": "2024-01-15T08:00:00+00:00" },
            "dcterms:subject": [
                { "o:label": "Medicine", "@value": "med" },
                { "@value": "Herbs" },
                { "type": "uri" }
            ],
            "dcterms:language": [{ "@value": "Thai" }],
            "o:primary_media": { "o:id": 7 }
        }))
    }

    #[test]
    fn test_title_prefers_direct_field() {
        assert_eq!(full_record().title(), "ตำรายาโบราณ");
    }

    #[test]
    fn test_title_falls_back_to_dcterms_title() {
        let record = Record::new(json!({ "dcterms:title": [{ "@value": "Palm-leaf manuscript" }] }));
        assert_eq!(record.title(), "Palm-leaf manuscript");
    }

    #[test]
    fn test_title_placeholder_when_missing() {
        let record = Record::new(json!({ "o:id": 1, "o:title": "" }));
        assert_eq!(record.title(), FALLBACK_TITLE);
        assert_eq!(Record::new(json!(null)).title(), FALLBACK_TITLE);
    }

    #[test]
    fn test_description_prefers_abstract() {
        assert_eq!(full_record().description(), "Herbal remedies");
        let record = Record::new(json!({ "dcterms:description": [{ "@value": "Desc" }] }));
        assert_eq!(record.description(), "Desc");
        assert_eq!(Record::new(json!({})).description(), "");
    }

    #[test]
    fn test_thumbnail_respects_preference() {
        let record = full_record();
        assert_eq!(
            record.thumbnail(ThumbnailPreference::LARGE_FIRST),
            Some("https://lib.example.org/thumb/large/42.jpg")
        );
        assert_eq!(
            record.thumbnail(ThumbnailPreference::MEDIUM_FIRST),
            Some("https://lib.example.org/thumb/medium/42.jpg")
        );
    }

    #[test]
    fn test_thumbnail_skips_missing_variants() {
        let record = Record::new(json!({
            "thumbnail_display_urls": { "large": null, "medium": "", "square": "sq.jpg" }
        }));
        assert_eq!(record.thumbnail(ThumbnailPreference::LARGE_FIRST), Some("sq.jpg"));
        assert_eq!(Record::new(json!({})).thumbnail(ThumbnailPreference::LARGE_FIRST), None);
    }

    #[test]
    fn test_created_display() {
        assert_eq!(full_record().created_display(DateLocale::Thai), "15 มกราคม 2567");
        assert_eq!(Record::new(json!({})).created_display(DateLocale::Thai), "-");
    }

    #[test]
    fn test_labels_prefer_label_then_value() {
        assert_eq!(
            full_record().labels(FacetDimension::Category),
            vec!["Medicine", "Herbs"]
        );
        assert_eq!(full_record().labels(FacetDimension::Language), vec!["Thai"]);
        assert!(full_record().labels(FacetDimension::Source).is_empty());
    }

    #[test]
    fn test_identifiers() {
        let record = full_record();
        assert_eq!(record.id().as_deref(), Some("42"));
        assert_eq!(record.primary_media_id().as_deref(), Some("7"));
        let no_media = Record::new(json!({ "o:primary_media": { "o:id": 0 } }));
        assert_eq!(no_media.primary_media_id(), None);
        let null_media = Record::new(json!({ "o:primary_media": null }));
        assert_eq!(null_media.primary_media_id(), None);
    }

    #[test]
    fn test_from_listing_non_array_is_empty() {
        assert!(Record::from_listing(json!({ "errors": "forbidden" })).is_empty());
        assert_eq!(Record::from_listing(json!([{ "o:id": 1 }, { "o:id": 2 }])).len(), 2);
    }

    #[test]
    fn test_media_original_url() {
        let media = json!({ "o:original_url": "https://lib.example.org/files/original/a.pdf" });
        assert_eq!(
            media_original_url(&media),
            Some("https://lib.example.org/files/original/a.pdf")
        );
        assert_eq!(media_original_url(&json!([])), None);
    }
}
