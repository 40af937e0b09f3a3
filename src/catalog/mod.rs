//! Filterable, paginated view over a loaded record set.
//!
//! [`CatalogView`] owns the records of one successful load together with the
//! user's filter and page. Facets are derived once from the full set; the
//! filtered list and the visible page are recomputed on demand. Any change
//! to the search text or a facet selection resets the page to 1.

mod facets;
mod filter;
mod pagination;

pub use facets::{Facet, FacetSummary, derive_facets};
pub use filter::{FilterState, filter_records, matches_search, matches_selection};
pub use pagination::{PAGE_WINDOW, PageControls, clamp_page, page_slice, page_window, total_pages};

use serde::Serialize;
use tracing::debug;

use crate::record::{DateLocale, FacetDimension, Record, ThumbnailPreference};

/// Presentation parameters for one of the two catalog surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewProfile {
    /// Short identifier used in logs.
    pub name: &'static str,
    /// Cards per page.
    pub page_size: usize,
    /// Thumbnail variant preference.
    pub thumbnails: ThumbnailPreference,
    /// Whether facet panels and facet filtering are offered.
    pub facets_enabled: bool,
    /// Whether page controls are offered; when off only page 1 is shown.
    pub paginated: bool,
}

impl ViewProfile {
    /// Full books listing: facets, 9 cards per page, large thumbnails.
    pub const BOOKS: Self = Self {
        name: "books",
        page_size: 9,
        thumbnails: ThumbnailPreference::LARGE_FIRST,
        facets_enabled: true,
        paginated: true,
    };

    /// Landing surface: search only, first 12 matches, medium thumbnails.
    pub const HOME: Self = Self {
        name: "home",
        page_size: 12,
        thumbnails: ThumbnailPreference::MEDIUM_FIRST,
        facets_enabled: false,
        paginated: false,
    };
}

impl Default for ViewProfile {
    fn default() -> Self {
        Self::BOOKS
    }
}

/// Display-ready fields for one result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Record identifier, if present.
    pub id: Option<String>,
    /// Resolved title.
    pub title: String,
    /// Resolved description (may be empty).
    pub description: String,
    /// Preferred thumbnail URL.
    pub thumbnail: Option<String>,
    /// Long-form creation date or `-`.
    pub created: String,
    /// Whether an "open file" action is available.
    pub has_file: bool,
}

impl Card {
    /// Builds a card for `record` using the profile's thumbnail order.
    #[must_use]
    pub fn from_record(record: &Record, profile: &ViewProfile, locale: DateLocale) -> Self {
        Self {
            id: record.id(),
            title: record.title().to_string(),
            description: record.description().to_string(),
            thumbnail: record.thumbnail(profile.thumbnails).map(str::to_string),
            created: record.created_display(locale),
            has_file: record.primary_media_id().is_some(),
        }
    }
}

/// Loaded records plus the user's current filter and page.
#[derive(Debug, Clone)]
pub struct CatalogView {
    records: Vec<Record>,
    facets: FacetSummary,
    filter: FilterState,
    page: usize,
    profile: ViewProfile,
}

impl CatalogView {
    /// Creates a view on page 1 with an empty filter.
    #[must_use]
    pub fn new(records: Vec<Record>, profile: ViewProfile) -> Self {
        let facets = if profile.facets_enabled {
            FacetSummary::from_records(&records)
        } else {
            FacetSummary::default()
        };
        debug!(
            view = profile.name,
            records = records.len(),
            categories = facets.categories.len(),
            languages = facets.languages.len(),
            sources = facets.sources.len(),
            "Catalog view created"
        );
        Self {
            records,
            facets,
            filter: FilterState::new(),
            page: 1,
            profile,
        }
    }

    /// All loaded records in server order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Facets over the full record set (empty when the profile disables them).
    #[must_use]
    pub fn facets(&self) -> &FacetSummary {
        &self.facets
    }

    /// Current search text and facet selections.
    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Profile this view was built with.
    #[must_use]
    pub fn profile(&self) -> &ViewProfile {
        &self.profile
    }

    /// Current page (1-based).
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Replaces the search text and returns to page 1.
    pub fn set_search(&mut self, text: &str) {
        self.filter.set_search(text);
        self.page = 1;
    }

    /// Toggles a facet label and returns to page 1.
    ///
    /// Ignored when the profile has facets disabled.
    pub fn toggle_facet(&mut self, dimension: FacetDimension, label: &str) {
        if !self.profile.facets_enabled {
            debug!(view = self.profile.name, %dimension, label, "Facets disabled; toggle ignored");
            return;
        }
        self.filter.toggle(dimension, label);
        self.page = 1;
    }

    /// Clears search and selections and returns to page 1.
    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.page = 1;
    }

    /// Records passing the current filter, in server order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Record> {
        filter_records(&self.records, &self.filter)
    }

    /// Number of pages for the current filtered list.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if !self.profile.paginated {
            return 1;
        }
        total_pages(self.filtered().len(), self.profile.page_size)
    }

    /// Moves to `page`, clamped into range. Returns the page now shown.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.page = clamp_page(page, self.total_pages());
        self.page
    }

    /// Advances one page; returns `false` when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page >= self.total_pages() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Goes back one page; returns `false` when already on page 1.
    pub fn previous_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Records on the current page.
    #[must_use]
    pub fn visible(&self) -> Vec<&Record> {
        let filtered = self.filtered();
        page_slice(&filtered, self.page, self.profile.page_size).to_vec()
    }

    /// Cards for the current page.
    #[must_use]
    pub fn cards(&self, locale: DateLocale) -> Vec<Card> {
        self.visible()
            .into_iter()
            .map(|record| Card::from_record(record, &self.profile, locale))
            .collect()
    }

    /// Page-control state, or `None` when the profile is not paginated.
    #[must_use]
    pub fn page_controls(&self) -> Option<PageControls> {
        self.profile
            .paginated
            .then(|| PageControls::new(self.page, self.total_pages()))
    }
}
