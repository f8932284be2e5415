//! Record representation and conversion helpers.
//!
//! Assets and attachment metadata are stored as untyped records: ordered maps from attribute
//! name to a tagged [`Bson`] value. The store only interprets the handful of attribute names
//! declared here; everything else is opaque to it.

use bson::{Bson, Document, ser::serialize_to_bson};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// An attribute-named bag of values describing one asset or one attachment.
pub type Record = Document;

/// Attribute holding the store-assigned identifier of a record.
pub const ID_FIELD: &str = "_id";
/// Attribute of an attachment record naming the asset that owns it.
pub const ASSET_ID_FIELD: &str = "assetId";
/// Attribute of an attachment record naming its stored content.
pub const CONTENT_ID_FIELD: &str = "gridFSId";
/// Attribute of an attachment record holding the attachment's file name.
pub const NAME_FIELD: &str = "name";
/// Attribute of an attachment record holding the MIME type of the content.
pub const CONTENT_TYPE_FIELD: &str = "contentType";
/// Attribute of an attachment record holding the content length in bytes.
pub const SIZE_FIELD: &str = "size";

/// Convenience accessors shared by asset and attachment records.
pub trait RecordExt {
    /// Returns the record's identifier if one has been assigned.
    fn record_id(&self) -> Option<&str>;

    /// Returns the record with `_id` set to `id`, replacing any previous identifier.
    fn with_id(self, id: impl Into<String>) -> Self;

    /// Converts the record to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if a value has no JSON representation.
    fn to_json(&self) -> StoreResult<Value>;
}

impl RecordExt for Record {
    fn record_id(&self) -> Option<&str> {
        self.get(ID_FIELD).and_then(Bson::as_str)
    }

    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.insert(ID_FIELD, id.into());
        self
    }

    fn to_json(&self) -> StoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Builds a record from a JSON value, as received from the REST layer.
///
/// # Errors
///
/// Returns [`StoreError::InvalidRecord`] when `value` is not a JSON object, or
/// [`StoreError::Serialization`] when it cannot be represented as BSON.
pub fn record_from_json(value: Value) -> StoreResult<Record> {
    if !value.is_object() {
        return Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, found {value}"
        )));
    }

    match serialize_to_bson(&value)? {
        Bson::Document(record) => Ok(record),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a document, found {other}"
        ))),
    }
}

/// Converts a record to JSON for the REST layer. Same as [`RecordExt::to_json`].
pub fn record_to_json(record: &Record) -> StoreResult<Value> {
    record.to_json()
}
