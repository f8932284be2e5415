//! Query construction for asset collections.
//!
//! An [`AssetQuery`] combines four independent, optional parts:
//!
//! - **Filters** ([`AssetFilter`]) - an attribute path plus a list of acceptable
//!   [`Condition`]s. Conditions inside one filter are OR-combined; separate filters are
//!   AND-combined, so every additional filter narrows the result.
//! - **Search** - a free-text string with quoted phrases, `-negated` terms and plain words.
//! - **Sort** ([`SortOptions`]) - an attribute path and a [`SortOrder`].
//! - **Pagination** ([`PaginationOptions`]) - an offset and a limit.
//!
//! # Example
//!
//! ```ignore
//! use assetlayer::query::{AssetFilter, AssetQuery, Condition, SortOrder};
//!
//! let query = AssetQuery::builder()
//!     .filter(AssetFilter::eq("type", "com.ibm.websphere.Feature"))
//!     .filter(AssetFilter::new("state", vec![
//!         Condition::equals("published"),
//!         Condition::equals("draft"),
//!     ]))
//!     .search("\"web profile\" -beta")
//!     .sort("name", SortOrder::Ascending)
//!     .paginate(0, 20)
//!     .build();
//! ```

use bson::Bson;

use crate::page::PaginationOptions;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (A to Z).
    Ascending,
    /// Descending order (Z to A).
    Descending,
}

/// Attribute path and direction to order results by.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOptions {
    /// Dot-separated attribute path to sort by.
    pub field: String,
    /// The sort direction.
    pub order: SortOrder,
}

impl SortOptions {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self { field: field.into(), order }
    }
}

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The value equals the literal.
    Equals,
    /// The value differs from the literal.
    NotEquals,
}

/// A single acceptable outcome for a filtered attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operation: Operation,
    pub value: Bson,
}

impl Condition {
    pub fn new(operation: Operation, value: impl Into<Bson>) -> Self {
        Self { operation, value: value.into() }
    }

    /// Accepts values equal to `value`.
    pub fn equals(value: impl Into<Bson>) -> Self {
        Self::new(Operation::Equals, value)
    }

    /// Accepts values different from `value`.
    pub fn not_equals(value: impl Into<Bson>) -> Self {
        Self::new(Operation::NotEquals, value)
    }
}

/// An attribute path with the conditions it may satisfy.
///
/// A record passes the filter when the value at `key` satisfies at least one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFilter {
    /// Dot-separated attribute path, e.g. `wlpInformation.visibility`.
    pub key: String,
    pub conditions: Vec<Condition>,
}

impl AssetFilter {
    pub fn new(key: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self { key: key.into(), conditions }
    }

    /// Filter with a single equality condition.
    pub fn eq(key: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(key, vec![Condition::equals(value)])
    }

    /// Filter with a single inequality condition.
    pub fn ne(key: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(key, vec![Condition::not_equals(value)])
    }

    /// Adds another acceptable condition.
    pub fn or(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A structured query over the asset collection.
///
/// Every part is optional; the default query returns all assets in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    /// Filters that must all pass.
    pub filters: Vec<AssetFilter>,
    /// Free-text search string.
    pub search: Option<String>,
    /// Offset and limit applied after sorting.
    pub pagination: Option<PaginationOptions>,
    /// Explicit sort. When absent and `search` is set, results are ordered by match score.
    pub sort: Option<SortOptions>,
}

impl AssetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> AssetQueryBuilder {
        AssetQueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetQueryBuilder {
    query: AssetQuery,
}

impl AssetQueryBuilder {
    pub fn new() -> Self {
        AssetQueryBuilder { query: AssetQuery::default() }
    }

    /// Adds a filter; all filters must match.
    pub fn filter(mut self, filter: AssetFilter) -> Self {
        self.query.filters.push(filter);
        self
    }

    /// Adds several filters at once.
    pub fn filters(mut self, filters: impl IntoIterator<Item = AssetFilter>) -> Self {
        self.query.filters.extend(filters);
        self
    }

    /// Sets the free-text search string.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.query.search = Some(search.into());
        self
    }

    /// Sets the offset and limit of the returned slice.
    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.query.pagination = Some(PaginationOptions::new(offset, limit));
        self
    }

    /// Sets the sort specification.
    ///
    /// # Arguments
    ///
    /// * `field` - The attribute path to sort by
    /// * `order` - The sort direction
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.query.sort = Some(SortOptions::new(field, order));
        self
    }

    pub fn build(self) -> AssetQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_filters() {
        let query = AssetQuery::builder()
            .filter(AssetFilter::eq("type", "feature"))
            .filter(AssetFilter::ne("state", "draft").or(Condition::equals("draft-review")))
            .search("wibble")
            .paginate(10, 5)
            .build();

        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].conditions.len(), 2);
        assert_eq!(query.filters[1].conditions[0].operation, Operation::NotEquals);
        assert_eq!(query.search.as_deref(), Some("wibble"));
        assert_eq!(query.pagination, Some(PaginationOptions::new(10, 5)));
        assert_eq!(query.sort, None);
    }

    #[test]
    fn default_query_is_empty() {
        let query = AssetQuery::new();

        assert!(query.filters.is_empty());
        assert!(query.search.is_none());
        assert!(query.pagination.is_none());
    }
}
