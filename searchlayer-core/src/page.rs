//! Pagination windows and result pages.
//!
//! This module computes the skip/limit window for a search call — including
//! the first-page-size override — and provides the [`Page`] struct returned
//! to callers for navigating large result sets.

use serde::{Deserialize, Serialize};

use crate::model::SearchRequest;

/// A skip/limit window over a filtered result sequence.
///
/// Pages are 1-indexed. With a first-page override `f > 0`, page 1 returns
/// `f` records from offset 0 and page `n > 1` returns `limit` records from
/// offset `limit·(n−2) + f`; without one, every page returns `limit` records
/// from offset `limit·(n−1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Number of records to skip.
    pub skip: u64,
    /// Maximum number of records to return.
    pub limit: u64,
}

impl Window {
    /// Computes the window for a page. `page` values below 1 are treated as 1.
    pub fn new(page: u64, limit: u64, first_limit: u64) -> Self {
        let page = page.max(1);
        if first_limit > 0 {
            if page == 1 {
                Window {
                    skip: 0,
                    limit: first_limit,
                }
            } else {
                Window {
                    skip: limit * (page - 2) + first_limit,
                    limit,
                }
            }
        } else {
            Window {
                skip: limit * (page - 1),
                limit,
            }
        }
    }
}

impl SearchRequest {
    /// The pagination window described by this directive.
    pub fn window(&self) -> Window {
        Window::new(self.page, self.limit, self.first_limit)
    }
}

/// A single page of search results.
///
/// `count` is the total number of records matching the filter across all
/// pages, not the size of this page.
///
/// # Example
///
/// ```ignore
/// use searchlayer_core::page::Page;
///
/// let page: Page<String> = Page::builder(vec!["item1".to_string()])
///     .with_count(100)
///     .with_next_page(Some(2))
///     .build();
///
/// assert_eq!(page.items.len(), 1);
/// assert_eq!(page.count, 100);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    pub items: Vec<T>,
    /// Total count of matching records across all pages.
    pub count: u64,
    /// The next page number (if more pages exist).
    pub next_page: Option<u64>,
    /// The previous page number (if this is not the first page).
    pub previous_page: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a new builder for constructing a page with custom settings.
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }

    /// Builds a page from fetched items, a total count, and the directive
    /// that produced them, deriving the navigation metadata.
    pub fn from_results(items: Vec<T>, count: u64, request: &SearchRequest) -> Self {
        let page = request.page.max(1);
        let window = request.window();
        let consumed = window.skip + items.len() as u64;

        Page::builder(items)
            .with_count(count)
            .with_next_page((consumed < count).then_some(page + 1))
            .with_previous_page((page > 1).then(|| page - 1))
            .build()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }
}

/// Builder for constructing [`Page`] instances with a fluent API.
pub struct PageBuilder<T> {
    items: Vec<T>,
    count: u64,
    next_page: Option<u64>,
    previous_page: Option<u64>,
}

impl<T> PageBuilder<T> {
    /// Creates a new builder with the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }

    /// Sets the total count of matching records.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Sets the next page number (or `None` if this is the last page).
    pub fn with_next_page(mut self, next_page: Option<u64>) -> Self {
        self.next_page = next_page;
        self
    }

    /// Sets the previous page number (or `None` if this is the first page).
    pub fn with_previous_page(mut self, previous_page: Option<u64>) -> Self {
        self.previous_page = previous_page;
        self
    }

    /// Builds and returns the final [`Page`] instance.
    pub fn build(self) -> Page<T> {
        Page {
            items: self.items,
            count: self.count,
            next_page: self.next_page,
            previous_page: self.previous_page,
        }
    }
}
