//! Facet derivation over the full record set.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::record::{FacetDimension, Record};

/// A label and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    /// Label as it appears in the records (case preserved).
    pub name: String,
    /// Number of records exhibiting the label.
    pub count: usize,
}

/// Counts labels of one dimension across `records`.
///
/// Sorted by descending count, ties broken by ascending label. A record that
/// repeats a label is counted once for it.
#[must_use]
pub fn derive_facets(records: &[Record], dimension: FacetDimension) -> Vec<Facet> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let unique: HashSet<&str> = record.labels(dimension).into_iter().collect();
        for label in unique {
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    let mut facets: Vec<Facet> = counts
        .into_iter()
        .map(|(name, count)| Facet {
            name: name.to_string(),
            count,
        })
        .collect();
    facets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    facets
}

/// Facets for every dimension, computed once per record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetSummary {
    /// Subject / category labels.
    pub categories: Vec<Facet>,
    /// Language labels.
    pub languages: Vec<Facet>,
    /// Source labels.
    pub sources: Vec<Facet>,
}

impl FacetSummary {
    /// Derives all three dimensions from `records`.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            categories: derive_facets(records, FacetDimension::Category),
            languages: derive_facets(records, FacetDimension::Language),
            sources: derive_facets(records, FacetDimension::Source),
        }
    }

    /// Returns the facets of one dimension.
    #[must_use]
    pub fn get(&self, dimension: FacetDimension) -> &[Facet] {
        match dimension {
            FacetDimension::Category => &self.categories,
            FacetDimension::Language => &self.languages,
            FacetDimension::Source => &self.sources,
        }
    }
}
