//! Search text and facet selections, and the record predicate they define.

use std::collections::BTreeSet;

use crate::record::{FacetDimension, Record};

/// Active search text and facet selections.
///
/// Selections hold lower-cased labels. An empty selection places no
/// constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    categories: BTreeSet<String>,
    languages: BTreeSet<String>,
    sources: BTreeSet<String>,
}

impl FilterState {
    /// Creates an empty filter (matches every record).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replaces the search text, trimming surrounding whitespace.
    ///
    /// Returns `true` if the stored text changed.
    pub fn set_search(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if self.search == trimmed {
            return false;
        }
        self.search = trimmed.to_string();
        true
    }

    /// Inserts the lower-cased label if absent, removes it if present.
    pub fn toggle(&mut self, dimension: FacetDimension, label: &str) {
        let key = label.to_lowercase();
        let selection = self.selection_mut(dimension);
        if !selection.remove(&key) {
            selection.insert(key);
        }
    }

    /// Returns the selected labels of one dimension.
    #[must_use]
    pub fn selection(&self, dimension: FacetDimension) -> &BTreeSet<String> {
        match dimension {
            FacetDimension::Category => &self.categories,
            FacetDimension::Language => &self.languages,
            FacetDimension::Source => &self.sources,
        }
    }

    fn selection_mut(&mut self, dimension: FacetDimension) -> &mut BTreeSet<String> {
        match dimension {
            FacetDimension::Category => &mut self.categories,
            FacetDimension::Language => &mut self.languages,
            FacetDimension::Source => &mut self.sources,
        }
    }

    /// Returns true if `label` (any case) is selected in `dimension`.
    #[must_use]
    pub fn is_selected(&self, dimension: FacetDimension, label: &str) -> bool {
        self.selection(dimension).contains(&label.to_lowercase())
    }

    /// Returns true when no search text and no selections are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && FacetDimension::ALL
                .iter()
                .all(|dimension| self.selection(*dimension).is_empty())
    }

    /// Clears search text and every selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true if `record` satisfies the search text and every selection.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        matches_search(record, &self.search)
            && FacetDimension::ALL
                .iter()
                .all(|dimension| matches_selection(record, *dimension, self.selection(*dimension)))
    }
}

/// Case-insensitive substring match on the resolved title or description.
#[must_use]
pub fn matches_search(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    record.title().to_lowercase().contains(&query)
        || record.description().to_lowercase().contains(&query)
}

/// True when `selection` is empty or shares a lower-cased label with `record`.
#[must_use]
pub fn matches_selection(
    record: &Record,
    dimension: FacetDimension,
    selection: &BTreeSet<String>,
) -> bool {
    selection.is_empty()
        || record
            .labels(dimension)
            .into_iter()
            .any(|label| selection.contains(&label.to_lowercase()))
}

/// Returns the records passing `filter`, in their original order.
#[must_use]
pub fn filter_records<'a>(records: &'a [Record], filter: &FilterState) -> Vec<&'a Record> {
    records.iter().filter(|record| filter.matches(record)).collect()
}
