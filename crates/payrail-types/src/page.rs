//! Pagination shapes for listing endpoints.

use serde::{Deserialize, Serialize};

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub page: usize,
    pub size: usize,
}

impl<T> Page<T> {
    /// Build a page from the items of the current window and the unpaged total.
    #[must_use]
    pub fn new(items: Vec<T>, total_elements: usize, request: PageRequest) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(request.size)
        };
        Self {
            items,
            total_elements,
            total_pages,
            page: request.page,
            size: request.size,
        }
    }

    /// An empty page for the given request.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 11, PageRequest::new(0, 5));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 11);
    }

    #[test]
    fn empty_page() {
        let page: Page<u32> = Page::empty(PageRequest::default());
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.size, 20);
    }

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageRequest::new(2, 25).offset(), 50);
        assert_eq!(PageRequest::new(0, 25).offset(), 0);
    }

    #[test]
    fn zero_size_yields_zero_pages() {
        let page: Page<u32> = Page::new(Vec::new(), 10, PageRequest::new(0, 0));
        assert_eq!(page.total_pages, 0);
    }
}
