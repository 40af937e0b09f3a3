//! Page arithmetic and page-control state.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Number of numbered page buttons shown at once.
pub const PAGE_WINDOW: usize = 6;

/// Page count for `total` items; at least 1 even when there are none.
#[must_use]
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a requested page into `[1, total_pages]`.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The contiguous slice `[(page-1)*size, page*size)` clamped to `items`.
#[must_use]
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page
        .max(1)
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Numbered pages to display around `page`.
///
/// Starts two pages before the current one and spans up to
/// [`PAGE_WINDOW`] pages, shifted left when it would run past the end.
#[must_use]
pub fn page_window(page: usize, total_pages: usize) -> RangeInclusive<usize> {
    let total_pages = total_pages.max(1);
    let mut start = page.saturating_sub(2).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    if end + 1 - start < PAGE_WINDOW {
        start = (end + 1).saturating_sub(PAGE_WINDOW).max(1);
    }
    start..=end
}

/// State of the pagination control for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    /// Current page (1-based).
    pub page: usize,
    /// Total number of pages (at least 1).
    pub total_pages: usize,
    /// Numbered pages in the sliding window.
    pub numbers: Vec<usize>,
    /// Whether "previous" is enabled.
    pub has_previous: bool,
    /// Whether "next" is enabled.
    pub has_next: bool,
}

impl PageControls {
    /// Computes control state for `page` of `total_pages`.
    #[must_use]
    pub fn new(page: usize, total_pages: usize) -> Self {
        let total_pages = total_pages.max(1);
        let page = clamp_page(page, total_pages);
        Self {
            page,
            total_pages,
            numbers: page_window(page, total_pages).collect(),
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_floor_of_one() {
        assert_eq!(total_pages(0, 9), 1);
        assert_eq!(total_pages(9, 9), 1);
        assert_eq!(total_pages(10, 9), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_slice_bounds() {
        let items: Vec<usize> = (0..20).collect();
        assert_eq!(page_slice(&items, 1, 9), &items[0..9]);
        assert_eq!(page_slice(&items, 3, 9), &items[18..20]);
        assert!(page_slice(&items, 4, 9).is_empty());
        assert_eq!(page_slice(&items, 0, 9), &items[0..9]);
    }

    #[test]
    fn test_pages_concatenate_to_input() {
        let items: Vec<usize> = (0..23).collect();
        let pages = total_pages(items.len(), 9);
        let rebuilt: Vec<usize> = (1..=pages)
            .flat_map(|page| page_slice(&items, page, 9).iter().copied())
            .collect();
        assert_eq!(rebuilt, items);
        for page in 1..=pages {
            assert!(page_slice(&items, page, 9).len() <= 9);
        }
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(5, 0), 1);
    }

    #[test]
    fn test_page_window_slides() {
        assert_eq!(page_window(1, 20), 1..=6);
        assert_eq!(page_window(5, 20), 3..=8);
        assert_eq!(page_window(20, 20), 15..=20);
        assert_eq!(page_window(19, 20), 15..=20);
        assert_eq!(page_window(2, 3), 1..=3);
    }

    #[test]
    fn test_controls_disable_at_bounds() {
        let first = PageControls::new(1, 4);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = PageControls::new(4, 4);
        assert!(last.has_previous);
        assert!(!last.has_next);

        let only = PageControls::new(1, 1);
        assert!(!only.has_previous && !only.has_next);
        assert_eq!(only.numbers, vec![1]);
    }
}
