//! Convenient re-exports of commonly used types from assetlayer.
//!
//! ```ignore
//! use assetlayer::prelude::*;
//! ```

pub use assetlayer_core::{
    attachment::{AttachmentContentMetadata, AttachmentContentResponse},
    backend::{AssetBackend, AssetBackendBuilder, DynAssetBackend},
    error::{ArtefactKind, StoreError, StoreResult},
    page::{Page, PaginationOptions},
    query::{AssetFilter, AssetQuery, AssetQueryBuilder, Condition, Operation, SortOptions, SortOrder},
    record::{Record, RecordExt, record_from_json, record_to_json},
    store::{AssetStore, DynAssetStore, IntoDynAssetStore},
};
