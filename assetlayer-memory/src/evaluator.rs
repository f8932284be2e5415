//! Filter evaluation for in-memory asset records.
//!
//! This module resolves dot-separated attribute paths inside records and decides whether the
//! resolved values satisfy the conditions of an [`AssetFilter`].

use std::{borrow::Cow, collections::HashMap};

use bson::{Bson, Document};

use assetlayer_core::query::{AssetFilter, Condition, Operation};

/// Extracts the value at a dot-separated `path` from `record`.
///
/// Nested documents are descended into. When an intermediate value is an array, the rest of
/// the path is resolved against every document in it and the results are collected into a
/// new array; array elements that are not documents, and elements where the rest of the path
/// is missing, are skipped. Any other intermediate value makes the path absent.
///
/// ```ignore
/// let record = doc! { "a": [{ "b": 1 }, { "b": 2 }, "skipped"] };
/// assert_eq!(resolve(&record, "a.b").as_deref(), Some(&bson!([1, 2])));
/// ```
pub fn resolve<'a>(record: &'a Document, path: &str) -> Option<Cow<'a, Bson>> {
    let segments = path.split('.').collect::<Vec<_>>();

    resolve_segments(record, &segments)
}

fn resolve_segments<'a>(record: &'a Document, path: &[&str]) -> Option<Cow<'a, Bson>> {
    let (head, rest) = path.split_first()?;
    let value = record.get(*head)?;

    if rest.is_empty() {
        return Some(Cow::Borrowed(value));
    }

    match value {
        Bson::Document(nested) => resolve_segments(nested, rest),
        Bson::Array(items) => Some(Cow::Owned(Bson::Array(
            items
                .iter()
                .filter_map(Bson::as_document)
                .filter_map(|nested| resolve_segments(nested, rest))
                .map(Cow::into_owned)
                .collect(),
        ))),
        _ => None,
    }
}

/// Value representation used for equality checks.
///
/// `Int32` and `Int64` both become [`Comparable::Int`] and compare exactly, so a literal `1`
/// given as an `Int64` equals a stored `Int32`. An integer equals a `Double` only when the
/// double holds exactly that integer. Document equality ignores attribute order.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Types without a normalized form compare by exact BSON equality.
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(items) => Comparable::Array(
                items
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::Int(int), Comparable::Number(double))
            | (Comparable::Number(double), Comparable::Int(int)) => int_equals_double(*int, *double),
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

// 2^63 is exact as a double; every integral double below it and at or above -2^63 fits in
// an i64 without rounding.
fn int_equals_double(int: i64, double: f64) -> bool {
    double.fract() == 0.0
        && double >= i64::MIN as f64
        && double < i64::MAX as f64
        && double as i64 == int
}

/// Decides whether a resolved value satisfies `condition`.
///
/// An array satisfies the condition when any of its elements does, for both operations.
/// An absent value equals nothing, so it satisfies only [`Operation::NotEquals`].
pub fn satisfies(value: Option<&Bson>, condition: &Condition) -> bool {
    if let Some(Bson::Array(items)) = value {
        return items
            .iter()
            .any(|item| satisfies(Some(item), condition));
    }

    let literal_equals = value
        .is_some_and(|value| Comparable::from(&condition.value) == Comparable::from(value));

    match condition.operation {
        Operation::Equals => literal_equals,
        Operation::NotEquals => !literal_equals,
    }
}

/// Evaluates filters against a single record.
pub(crate) struct RecordEvaluator<'a> {
    record: &'a Document,
}

impl<'a> RecordEvaluator<'a> {
    pub fn new(record: &'a Document) -> Self {
        Self { record }
    }

    /// A record matches a filter when the value at the filter's key satisfies any condition.
    pub fn matches_filter(&self, filter: &AssetFilter) -> bool {
        let value = resolve(self.record, &filter.key);

        filter
            .conditions
            .iter()
            .any(|condition| satisfies(value.as_deref(), condition))
    }

    /// A record matches a set of filters when it matches every one of them.
    pub fn matches_all(&self, filters: &[AssetFilter]) -> bool {
        filters
            .iter()
            .all(|filter| self.matches_filter(filter))
    }
}

/// Returns `true` if `record` passes `filter`.
pub fn matches_filter(record: &Document, filter: &AssetFilter) -> bool {
    RecordEvaluator::new(record).matches_filter(filter)
}

/// Returns `true` if `record` passes every filter in `filters`.
pub fn matches_all_filters(record: &Document, filters: &[AssetFilter]) -> bool {
    RecordEvaluator::new(record).matches_all(filters)
}
