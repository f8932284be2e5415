//! Pagination and result types for query results.
//!
//! [`PaginationOptions`] slices an ordered result set by offset and limit, and [`Page`]
//! carries one slice together with the total number of matches.

use serde::{Deserialize, Serialize};
use std::cmp::min;

/// Offset and limit applied to an ordered result set.
///
/// # Example
///
/// ```ignore
/// use assetlayer::page::PaginationOptions;
///
/// let options = PaginationOptions::new(3, 10);
/// assert_eq!(options.paginate(vec![1, 2, 3, 4, 5]), vec![4, 5]);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Number of items to skip.
    pub offset: usize,
    /// Maximum number of items to return.
    pub limit: usize,
}

impl PaginationOptions {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Returns the contiguous slice of `items` selected by these options.
    ///
    /// An offset at or beyond the end yields an empty vector; the limit is clamped to the
    /// number of remaining items.
    pub fn paginate<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.offset >= items.len() {
            return Vec::new();
        }

        let end = min(self.offset.saturating_add(self.limit), items.len());
        items.truncate(end);
        items.drain(..self.offset);
        items
    }
}

/// Applies optional pagination; `None` returns `items` unchanged.
pub fn paginate<T>(items: Vec<T>, options: Option<&PaginationOptions>) -> Vec<T> {
    match options {
        Some(options) => options.paginate(items),
        None => items,
    }
}

/// A single page of results plus the total number of matches across all pages.
///
/// # Example
///
/// ```ignore
/// let page = Page::builder(vec!["a", "b"])
///     .with_count(7)
///     .with_pagination(Some(PaginationOptions::new(0, 2)))
///     .build();
///
/// assert!(page.has_more());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    pub items: Vec<T>,
    /// Total count of matching items across all pages.
    pub count: usize,
    /// The pagination that produced this page, if any.
    pub pagination: Option<PaginationOptions>,
}

impl<T> Page<T> {
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }

    /// Returns `true` when matches exist beyond the end of this page.
    pub fn has_more(&self) -> bool {
        let consumed = self
            .pagination
            .map(|options| options.offset)
            .unwrap_or(0)
            .saturating_add(self.items.len());

        consumed < self.count
    }

    /// Pagination options selecting the page after this one, if there is one.
    pub fn next(&self) -> Option<PaginationOptions> {
        let options = self.pagination?;

        self.has_more()
            .then(|| PaginationOptions::new(options.offset.saturating_add(options.limit), options.limit))
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            pagination: None,
        }
    }
}

/// Builder for constructing [`Page`] instances.
pub struct PageBuilder<T> {
    items: Vec<T>,
    count: Option<usize>,
    pagination: Option<PaginationOptions>,
}

impl<T> PageBuilder<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            count: None,
            pagination: None,
        }
    }

    /// Sets the total count of matches. Defaults to the number of items.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_pagination(mut self, pagination: Option<PaginationOptions>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn build(self) -> Page<T> {
        Page {
            count: self.count.unwrap_or(self.items.len()),
            items: self.items,
            pagination: self.pagination,
        }
    }
}
