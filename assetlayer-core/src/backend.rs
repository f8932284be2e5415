//! Storage backend abstraction for the asset store.
//!
//! The [`AssetBackend`] trait is the storage contract the REST layer calls into. It covers
//! four groups of operations:
//!
//! - asset CRUD plus query, count and distinct-value lookups
//! - attachment metadata CRUD plus lookup by owning asset
//! - attachment content upload, retrieval and deletion
//! - identifier allocation
//!
//! Implementations are required to be thread-safe (`Send + Sync`) and support concurrent
//! access from many request-handling tasks.
//!
//! # Examples
//!
//! ```ignore
//! use assetlayer::backend::AssetBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let created = backend.create_asset(doc! { "name": "Alice's feature" }).await?;
//! let fetched = backend.retrieve_asset(created.record_id().unwrap()).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use futures::io::AsyncRead;
use std::{any::Any, fmt::Debug};

use crate::{
    attachment::{AttachmentContentMetadata, AttachmentContentResponse},
    error::StoreResult,
    query::{AssetFilter, AssetQuery},
    record::Record,
};

/// Abstract interface for asset storage backends.
///
/// # Error Handling
///
/// Retrieval by identifier returns [`StoreError::NotFound`](crate::error::StoreError::NotFound)
/// when nothing is stored under the identifier. All other operations are defined for any input
/// and only fail on backend-level problems such as I/O errors.
#[async_trait]
pub trait AssetBackend: Send + Sync + Debug {
    /// Returns a fresh identifier that has never been returned before by this backend.
    ///
    /// Identifiers are shared between assets, attachments and attachment content.
    fn allocate_id(&self) -> String;

    /// Returns every stored asset, unfiltered and unsorted.
    async fn retrieve_all_assets(&self) -> StoreResult<Vec<Record>>;

    /// Queries assets using filters, free-text search, sorting and pagination.
    ///
    /// # Arguments
    ///
    /// * `query` - The [`AssetQuery`] to run
    ///
    /// # Returns
    ///
    /// The selected page of matching assets. Transient scoring attributes never appear
    /// in the returned records.
    async fn query_assets(&self, query: AssetQuery) -> StoreResult<Vec<Record>>;

    /// Counts the assets matching the filters and search string.
    async fn count_assets(
        &self,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<usize>;

    /// Returns the distinct values found at `field` in the assets matching the filters and
    /// search string. Assets without a value at `field` are ignored.
    async fn distinct_values(
        &self,
        field: &str,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<Vec<Bson>>;

    /// Stores a new asset under a freshly allocated identifier.
    ///
    /// Any `_id` supplied by the caller is overwritten.
    ///
    /// # Returns
    ///
    /// A copy of the stored record, including its `_id`.
    async fn create_asset(&self, asset: Record) -> StoreResult<Record>;

    /// Retrieves a copy of the asset stored under `id`.
    async fn retrieve_asset(&self, id: &str) -> StoreResult<Record>;

    /// Replaces the asset stored under `id` wholesale.
    ///
    /// No attributes of the previous record are kept.
    async fn update_asset(&self, id: &str, asset: Record) -> StoreResult<Record>;

    /// Removes the asset stored under `id`. Removing an unknown id is a no-op.
    ///
    /// Attachments of the asset are not touched.
    async fn delete_asset(&self, id: &str) -> StoreResult<()>;

    /// Stores attachment metadata.
    ///
    /// An `_id` already present on the record is kept, so callers can allocate the identifier
    /// up front with [`allocate_id`](Self::allocate_id). Otherwise one is allocated.
    async fn create_attachment_metadata(&self, attachment: Record) -> StoreResult<Record>;

    /// Retrieves a copy of the attachment metadata stored under `id`.
    async fn retrieve_attachment_metadata(&self, id: &str) -> StoreResult<Record>;

    /// Removes the attachment metadata stored under `id`. Removing an unknown id is a no-op.
    ///
    /// The attachment's content is not touched.
    async fn delete_attachment_metadata(&self, id: &str) -> StoreResult<()>;

    /// Returns copies of all attachment metadata records owned by `asset_id`.
    async fn find_attachments_for_asset(&self, asset_id: &str) -> StoreResult<Vec<Record>>;

    /// Drains `content` and stores the bytes under a freshly allocated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`](crate::error::StoreError::Persistence) if reading
    /// from `content` fails. Nothing is stored in that case.
    async fn create_attachment_content(
        &self,
        name: &str,
        content_type: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StoreResult<AttachmentContentMetadata>;

    /// Retrieves the attachment content stored under `id`.
    async fn retrieve_attachment_content(&self, id: &str) -> StoreResult<AttachmentContentResponse>;

    /// Removes the attachment content stored under `id`. Removing an unknown id is a no-op.
    async fn delete_attachment_content(&self, id: &str) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> AssetBackend for &B
where
    B: AssetBackend + ?Sized,
{
    fn allocate_id(&self) -> String {
        (*self).allocate_id()
    }

    async fn retrieve_all_assets(&self) -> StoreResult<Vec<Record>> {
        (*self).retrieve_all_assets().await
    }

    async fn query_assets(&self, query: AssetQuery) -> StoreResult<Vec<Record>> {
        (*self).query_assets(query).await
    }

    async fn count_assets(
        &self,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<usize> {
        (*self).count_assets(filters, search).await
    }

    async fn distinct_values(
        &self,
        field: &str,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<Vec<Bson>> {
        (*self)
            .distinct_values(field, filters, search)
            .await
    }

    async fn create_asset(&self, asset: Record) -> StoreResult<Record> {
        (*self).create_asset(asset).await
    }

    async fn retrieve_asset(&self, id: &str) -> StoreResult<Record> {
        (*self).retrieve_asset(id).await
    }

    async fn update_asset(&self, id: &str, asset: Record) -> StoreResult<Record> {
        (*self).update_asset(id, asset).await
    }

    async fn delete_asset(&self, id: &str) -> StoreResult<()> {
        (*self).delete_asset(id).await
    }

    async fn create_attachment_metadata(&self, attachment: Record) -> StoreResult<Record> {
        (*self)
            .create_attachment_metadata(attachment)
            .await
    }

    async fn retrieve_attachment_metadata(&self, id: &str) -> StoreResult<Record> {
        (*self).retrieve_attachment_metadata(id).await
    }

    async fn delete_attachment_metadata(&self, id: &str) -> StoreResult<()> {
        (*self).delete_attachment_metadata(id).await
    }

    async fn find_attachments_for_asset(&self, asset_id: &str) -> StoreResult<Vec<Record>> {
        (*self).find_attachments_for_asset(asset_id).await
    }

    async fn create_attachment_content(
        &self,
        name: &str,
        content_type: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StoreResult<AttachmentContentMetadata> {
        (*self)
            .create_attachment_content(name, content_type, content)
            .await
    }

    async fn retrieve_attachment_content(&self, id: &str) -> StoreResult<AttachmentContentResponse> {
        (*self).retrieve_attachment_content(id).await
    }

    async fn delete_attachment_content(&self, id: &str) -> StoreResult<()> {
        (*self).delete_attachment_content(id).await
    }
}

/// Object-safe counterpart of [`AssetBackend`] used for runtime backend selection.
///
/// Every [`AssetBackend`] implements this trait; it adds owned shutdown and downcasting.
#[async_trait]
pub trait DynAssetBackend: AssetBackend {
    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<B: AssetBackend + 'static> DynAssetBackend for B {
    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()> {
        (*self).shutdown().await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait AssetBackendBuilder {
    type Backend: AssetBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
