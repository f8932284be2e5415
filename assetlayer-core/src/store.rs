//! Main asset store interface for interacting with storage backends.
//!
//! - [`AssetStore`] - Store bound to a concrete backend type
//! - [`DynAssetStore`] - Store over a boxed backend chosen at runtime
//!
//! Besides forwarding the storage contract, the store implements the composite operations
//! the REST layer needs: paged queries with a total count, attachment upload with content,
//! and asset deletion that also removes the asset's attachments.
//!
//! # Example
//!
//! ```ignore
//! use assetlayer::store::AssetStore;
//!
//! let store = AssetStore::new(backend);
//! let asset = store.create_asset(doc! { "name": "Liberty Core" }).await?;
//! ```

use bson::Bson;
use futures::io::AsyncRead;
use tracing::debug;

use crate::{
    attachment::{AttachmentContentMetadata, AttachmentContentResponse},
    backend::{AssetBackend, DynAssetBackend},
    error::StoreResult,
    page::Page,
    query::{AssetFilter, AssetQuery},
    record::{
        ASSET_ID_FIELD, CONTENT_ID_FIELD, CONTENT_TYPE_FIELD, NAME_FIELD, Record, RecordExt,
        SIZE_FIELD,
    },
};

/// An asset store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct AssetStore<B: AssetBackend> {
    backend: B,
}

impl<B: AssetBackend> AssetStore<B> {
    /// Creates a new asset store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Allocates a fresh identifier, e.g. to build an attachment URL before storing it.
    pub fn allocate_id(&self) -> String {
        self.backend.allocate_id()
    }

    pub async fn retrieve_all_assets(&self) -> StoreResult<Vec<Record>> {
        self.backend.retrieve_all_assets().await
    }

    pub async fn query_assets(&self, query: AssetQuery) -> StoreResult<Vec<Record>> {
        self.backend.query_assets(query).await
    }

    /// Runs `query` and wraps the result in a [`Page`] carrying the total match count.
    ///
    /// The count ignores pagination but honours filters and search.
    pub async fn query_page(&self, query: AssetQuery) -> StoreResult<Page<Record>> {
        let count = self
            .backend
            .count_assets(&query.filters, query.search.as_deref())
            .await?;
        let pagination = query.pagination;
        let items = self.backend.query_assets(query).await?;

        Ok(Page::builder(items)
            .with_count(count)
            .with_pagination(pagination)
            .build())
    }

    pub async fn count_assets(
        &self,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<usize> {
        self.backend.count_assets(filters, search).await
    }

    pub async fn distinct_values(
        &self,
        field: &str,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<Vec<Bson>> {
        self.backend
            .distinct_values(field, filters, search)
            .await
    }

    pub async fn create_asset(&self, asset: Record) -> StoreResult<Record> {
        self.backend.create_asset(asset).await
    }

    pub async fn retrieve_asset(&self, id: &str) -> StoreResult<Record> {
        self.backend.retrieve_asset(id).await
    }

    pub async fn update_asset(&self, id: &str, asset: Record) -> StoreResult<Record> {
        self.backend.update_asset(id, asset).await
    }

    /// Deletes only the asset record; see [`delete_asset_with_attachments`](Self::delete_asset_with_attachments).
    pub async fn delete_asset(&self, id: &str) -> StoreResult<()> {
        self.backend.delete_asset(id).await
    }

    /// Deletes an asset together with the metadata and content of each of its attachments.
    ///
    /// The deletions are issued one by one and are not atomic as a group.
    pub async fn delete_asset_with_attachments(&self, asset_id: &str) -> StoreResult<()> {
        let attachments = self.backend.find_attachments_for_asset(asset_id).await?;

        for attachment in &attachments {
            if let Some(content_id) = attachment.get(CONTENT_ID_FIELD).and_then(Bson::as_str) {
                self.backend.delete_attachment_content(content_id).await?;
            }

            if let Some(attachment_id) = attachment.record_id() {
                self.backend.delete_attachment_metadata(attachment_id).await?;
            }
        }

        self.backend.delete_asset(asset_id).await?;

        debug!(asset_id, attachments = attachments.len(), "Deleted asset with attachments");

        Ok(())
    }

    pub async fn create_attachment_metadata(&self, attachment: Record) -> StoreResult<Record> {
        self.backend
            .create_attachment_metadata(attachment)
            .await
    }

    pub async fn retrieve_attachment_metadata(&self, id: &str) -> StoreResult<Record> {
        self.backend.retrieve_attachment_metadata(id).await
    }

    pub async fn delete_attachment_metadata(&self, id: &str) -> StoreResult<()> {
        self.backend.delete_attachment_metadata(id).await
    }

    pub async fn find_attachments_for_asset(&self, asset_id: &str) -> StoreResult<Vec<Record>> {
        self.backend.find_attachments_for_asset(asset_id).await
    }

    /// Uploads attachment content and stores metadata describing it.
    ///
    /// The owning asset must exist. The stored metadata gets `assetId`, `gridFSId`, `size`,
    /// `name` and `contentType` filled in; other attributes of `metadata` are kept as given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::error::StoreError::NotFound) if the asset does
    /// not exist, or [`StoreError::Persistence`](crate::error::StoreError::Persistence) if
    /// `content` cannot be read.
    pub async fn create_attachment_with_content(
        &self,
        asset_id: &str,
        mut metadata: Record,
        name: &str,
        content_type: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StoreResult<Record> {
        self.backend.retrieve_asset(asset_id).await?;

        let stored = self
            .backend
            .create_attachment_content(name, content_type, content)
            .await?;

        metadata.insert(ASSET_ID_FIELD, asset_id);
        metadata.insert(CONTENT_ID_FIELD, stored.id.as_str());
        metadata.insert(SIZE_FIELD, stored.length as i64);
        metadata.insert(NAME_FIELD, name);
        metadata.insert(CONTENT_TYPE_FIELD, content_type);

        let attachment = match self.backend.create_attachment_metadata(metadata).await {
            Ok(attachment) => attachment,
            Err(err) => {
                self.backend.delete_attachment_content(&stored.id).await?;
                return Err(err);
            }
        };

        debug!(
            asset_id,
            attachment_id = attachment.record_id(),
            content_id = %stored.id,
            length = stored.length,
            "Created attachment with content"
        );

        Ok(attachment)
    }

    pub async fn create_attachment_content(
        &self,
        name: &str,
        content_type: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StoreResult<AttachmentContentMetadata> {
        self.backend
            .create_attachment_content(name, content_type, content)
            .await
    }

    pub async fn retrieve_attachment_content(&self, id: &str) -> StoreResult<AttachmentContentResponse> {
        self.backend.retrieve_attachment_content(id).await
    }

    pub async fn delete_attachment_content(&self, id: &str) -> StoreResult<()> {
        self.backend.delete_attachment_content(id).await
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

/// An asset store over a backend selected at runtime.
#[derive(Debug)]
pub struct DynAssetStore {
    backend: Box<dyn DynAssetBackend>,
}

impl DynAssetStore {
    pub fn new(backend: Box<dyn DynAssetBackend>) -> Self {
        Self { backend }
    }

    /// Borrows this store as an [`AssetStore`] over the boxed backend.
    pub fn as_store(&self) -> AssetStore<&dyn DynAssetBackend> {
        AssetStore::new(&*self.backend)
    }

    /// Borrows the store with its concrete backend type, if the backend is a `B`.
    pub fn as_static<B>(&self) -> Option<AssetStore<&B>>
    where
        B: AssetBackend + 'static,
    {
        self.backend
            .as_any()
            .downcast_ref::<B>()
            .map(AssetStore::new)
    }

    /// Converts back into a statically typed store, if the backend is a `B`.
    pub fn into_static<B>(self) -> Option<AssetStore<B>>
    where
        B: AssetBackend + 'static,
    {
        self.backend
            .into_any()
            .downcast::<B>()
            .ok()
            .map(|backend| AssetStore::new(*backend))
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}

/// Conversion trait for turning a store into a [`DynAssetStore`].
pub trait IntoDynAssetStore {
    fn into_dyn(self) -> DynAssetStore;
}

impl<B: AssetBackend + 'static> IntoDynAssetStore for AssetStore<B> {
    fn into_dyn(self) -> DynAssetStore {
        DynAssetStore::new(Box::new(self.backend))
    }
}

impl IntoDynAssetStore for DynAssetStore {
    fn into_dyn(self) -> DynAssetStore {
        self
    }
}
