//! # Page Windowing
//!
//! Fixed-size windows over a growing, append-only entry sequence.
//!
//! Pages are 1-based and addressed by absolute offset. Bounds are clamped
//! against the current length, so a sequence that shrank since the last
//! call yields a shorter (or empty) window instead of panicking.

use std::ops::Range;

/// Offset range of page `page` within a sequence of length `len`.
///
/// Page 0 and a zero page size both produce an empty range.
pub fn page_bounds(len: usize, page: u32, page_size: usize) -> Range<usize> {
    if page == 0 || page_size == 0 {
        return 0..0;
    }
    let start = (page as usize - 1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Slice of `entries` belonging to `page`.
pub fn window_page<T>(entries: &[T], page: u32, page_size: usize) -> &[T] {
    &entries[page_bounds(entries.len(), page, page_size)]
}

/// Number of non-empty pages for a sequence of length `len`.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// A window shorter than a full page signals an exhausted source.
pub fn is_short_page(window_len: usize, page_size: usize) -> bool {
    window_len < page_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_page() {
        let entries: Vec<u32> = (0..20).collect();
        assert_eq!(window_page(&entries, 1, 8), &entries[0..8]);
    }

    #[test]
    fn test_last_page_short() {
        let entries: Vec<u32> = (0..20).collect();
        assert_eq!(window_page(&entries, 3, 8), &entries[16..20]);
        assert!(is_short_page(window_page(&entries, 3, 8).len(), 8));
    }

    #[test]
    fn test_out_of_range_page_empty() {
        let entries: Vec<u32> = (0..20).collect();
        assert!(window_page(&entries, 4, 8).is_empty());
        assert!(window_page(&entries, u32::MAX, 8).is_empty());
    }

    #[test]
    fn test_page_zero_empty() {
        let entries: Vec<u32> = (0..20).collect();
        assert!(window_page(&entries, 0, 8).is_empty());
        assert!(window_page(&entries, 1, 0).is_empty());
    }

    #[test]
    fn test_shrunk_source_clamps() {
        let entries: Vec<u32> = (0..20).collect();
        let shrunk = &entries[..10];
        assert_eq!(window_page(shrunk, 2, 8), &entries[8..10]);
        assert!(window_page(shrunk, 3, 8).is_empty());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 8), 0);
        assert_eq!(page_count(8, 8), 1);
        assert_eq!(page_count(15, 8), 2);
        assert_eq!(page_count(15, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_pages_partition_source(len in 0usize..200, page_size in 1usize..20) {
            let entries: Vec<usize> = (0..len).collect();
            let pages = page_count(len, page_size);

            let mut rebuilt = Vec::with_capacity(len);
            for page in 1..=pages {
                let window = window_page(&entries, page as u32, page_size);
                prop_assert!(!window.is_empty());
                if page < pages {
                    prop_assert_eq!(window.len(), page_size);
                }
                rebuilt.extend_from_slice(window);
            }
            prop_assert_eq!(rebuilt, entries.clone());

            for extra in 1..=3u32 {
                prop_assert!(window_page(&entries, pages as u32 + extra, page_size).is_empty());
            }
        }

        #[test]
        fn prop_window_never_exceeds_page(len in 0usize..200, page in 0u32..50, page_size in 0usize..20) {
            let entries: Vec<usize> = (0..len).collect();
            let window = window_page(&entries, page, page_size);
            prop_assert!(window.len() <= page_size);
        }
    }
}
