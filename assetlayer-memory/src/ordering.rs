//! Sorting of query results by a resolved attribute.

use std::cmp::Ordering;

use bson::{Bson, Document};

use assetlayer_core::query::{SortOptions, SortOrder};

use crate::evaluator::resolve;

/// Compares two records by the string value at `sort.field`.
///
/// Only string values take part in the ordering: records with a string value come first, in
/// lexicographic order, and records whose value is absent or not a string compare equal to
/// each other and after every string. [`SortOrder::Descending`] reverses the whole ordering.
pub fn compare_by_field(a: &Document, b: &Document, sort: &SortOptions) -> Ordering {
    let left = resolve(a, &sort.field);
    let right = resolve(b, &sort.field);

    let ascending = match (
        left.as_deref().and_then(Bson::as_str),
        right.as_deref().and_then(Bson::as_str),
    ) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match sort.order {
        SortOrder::Ascending => ascending,
        SortOrder::Descending => ascending.reverse(),
    }
}

/// Sorts `records` in place. Records comparing equal keep their relative order.
pub fn sort_records(records: &mut [Document], sort: &SortOptions) {
    records.sort_by(|a, b| compare_by_field(a, b, sort));
}
