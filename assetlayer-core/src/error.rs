//! Error types and result types for asset store operations.
//!
//! Retrieval of an identifier that is not stored is the only domain failure a backend raises;
//! it is reported as [`StoreError::NotFound`] together with the kind of artefact that was
//! looked up. Use [`StoreResult<T>`] as the return type for fallible operations.

use std::fmt;

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// The kind of stored artefact an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtefactKind {
    /// An asset metadata record.
    Asset,
    /// An attachment metadata record.
    Attachment,
    /// The binary payload of an attachment.
    AttachmentContent,
}

impl fmt::Display for ArtefactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtefactKind::Asset => "asset",
            ArtefactKind::Attachment => "attachment",
            ArtefactKind::AttachmentContent => "attachment content",
        })
    }
}

/// Represents all possible errors that can occur when interacting with an asset store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No artefact of the given kind is stored under the identifier.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
        /// Which mapping was searched.
        kind: ArtefactKind,
    },
    /// Reading or writing persisted data failed, e.g. while draining an upload stream.
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),
    /// Serialization/deserialization error when converting between record formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The supplied data cannot be used as a record (for example JSON that is not an object).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Builds a [`StoreError::NotFound`] for the given identifier and artefact kind.
    pub fn not_found(id: impl Into<String>, kind: ArtefactKind) -> Self {
        StoreError::NotFound { id: id.into(), kind }
    }

    /// Returns `true` when this error reports a missing artefact.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A specialized `Result` type for asset store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
