//! Fixed-size pagination
//!
//! Pages are 1-indexed. Page 0 is clamped to page 1; pages past the end
//! yield an empty slice rather than an error.

use aixiv_common::{AppError, Result};
use serde::Serialize;
use std::num::NonZeroUsize;

/// One window of an ordered result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: usize,
    pub total_matching: usize,
    pub page_size: usize,
}

/// Slices ordered results into pages of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroUsize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Result<Self> {
        NonZeroUsize::new(page_size)
            .map(|page_size| Self { page_size })
            .ok_or_else(|| AppError::Validation {
                message: "page_size must be at least 1".to_string(),
                field: Some("page_size".to_string()),
            })
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// `ceil(total / page_size)`; zero when there is nothing to show
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.get())
    }

    /// Take page `page` (clamped to at least 1) out of `items`
    pub fn paginate<T>(&self, items: Vec<T>, page: u32) -> Page<T> {
        let page = clamp_page(page);
        let total = items.len();
        let size = self.page_size.get();

        let start = ((page - 1) as usize).saturating_mul(size);
        let items = if start >= total {
            Vec::new()
        } else {
            items.into_iter().skip(start).take(size).collect()
        };

        Page {
            items,
            current_page: page,
            total_pages: self.total_pages(total),
            total_matching: total,
            page_size: size,
        }
    }
}

/// Page numbers below 1 are treated as page 1
pub fn clamp_page(page: u32) -> u32 {
    page.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(Paginator::new(0), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_total_pages() {
        let p = Paginator::new(3).unwrap();
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(3), 1);
        assert_eq!(p.total_pages(4), 2);
        assert_eq!(p.total_pages(9), 3);
    }

    #[test]
    fn test_pages_reconstruct_input() {
        for len in 0..12usize {
            for size in 1..5usize {
                let items: Vec<usize> = (0..len).collect();
                let p = Paginator::new(size).unwrap();
                let pages = p.total_pages(len) as u32;

                let mut rebuilt = Vec::new();
                for page in 1..=pages {
                    let slice = p.paginate(items.clone(), page);
                    assert!(!slice.items.is_empty());
                    assert!(slice.items.len() <= size);
                    assert_eq!(slice.total_matching, len);
                    rebuilt.extend(slice.items);
                }
                assert_eq!(rebuilt, items, "len {len} size {size}");

                let beyond = p.paginate(items.clone(), pages + 1);
                assert!(beyond.items.is_empty());
                assert_eq!(beyond.total_pages, pages as usize);
            }
        }
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let p = Paginator::new(2).unwrap();
        let page = p.paginate(vec!['a', 'b', 'c'], 0);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items, vec!['a', 'b']);
    }

    #[test]
    fn test_far_page_is_empty() {
        let p = Paginator::new(usize::MAX).unwrap();
        let page = p.paginate(vec![1, 2, 3], u32::MAX);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
