//! Types describing stored attachment content.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier and length of freshly stored attachment content.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContentMetadata {
    /// Identifier under which the content can be retrieved or deleted.
    pub id: String,
    /// Number of bytes stored.
    pub length: usize,
}

/// Attachment content as returned from the store.
///
/// `content` shares the store's backing buffer; it is read-only by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContentResponse {
    /// File name given at upload time.
    pub name: String,
    /// MIME type given at upload time.
    pub content_type: String,
    /// The raw bytes.
    pub content: Arc<[u8]>,
}

impl AttachmentContentResponse {
    /// Number of bytes of content.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
