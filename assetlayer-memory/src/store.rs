//! In-memory storage implementation of the asset storage contract.
//!
//! Assets, attachment metadata and attachment content live in three independent maps, each
//! behind its own async-aware read-write lock. One [`IdAllocator`] hands out identifiers for
//! all three.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use bson::Bson;
use futures::io::{AsyncRead, AsyncReadExt};
use mea::rwlock::RwLock;
use tracing::debug;

use assetlayer_core::{
    attachment::{AttachmentContentMetadata, AttachmentContentResponse},
    backend::{AssetBackend, AssetBackendBuilder},
    error::{ArtefactKind, StoreError, StoreResult},
    page::paginate,
    query::{AssetFilter, AssetQuery, SortOptions, SortOrder},
    record::{ASSET_ID_FIELD, ID_FIELD, Record, RecordExt},
};

use crate::{
    evaluator::{RecordEvaluator, resolve},
    id::IdAllocator,
    ordering::sort_records,
    search::{MATCH_SCORE_FIELD, SearchQuery},
};

// Keyed by id; allocated ids sort in creation order.
type RecordMap = BTreeMap<String, Record>;
type ContentMap = HashMap<String, StoredContent>;

#[derive(Debug)]
struct StoredContent {
    name: String,
    content_type: String,
    content: Arc<[u8]>,
}

/// Thread-safe in-memory asset storage backend.
///
/// `InMemoryStore` is cloneable; clones share the same underlying data and identifier
/// allocator. Every read returns a deep copy of the stored record, so callers can mutate
/// results freely. Attachment content is the exception: it is handed out as a shared,
/// immutable `Arc<[u8]>`.
///
/// # Performance
///
/// Queries scan every asset (no indexing) and copy the matching records. This is intended for
/// development and small-scale testing, not for production data volumes.
///
/// # Example
///
/// ```ignore
/// use assetlayer_memory::InMemoryStore;
/// use assetlayer::backend::AssetBackend;
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     let created = store.create_asset(doc! { "name": "Liberty Core" }).await?;
///     let id = created.get_str("_id")?;
///
///     assert_eq!(store.retrieve_asset(id).await?, created);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    assets: Arc<RwLock<RecordMap>>,
    attachments: Arc<RwLock<RecordMap>>,
    contents: Arc<RwLock<ContentMap>>,
    ids: Arc<IdAllocator>,
}

impl InMemoryStore {
    /// Creates an empty store with its own identifier allocator.
    pub fn new() -> Self {
        Self::with_id_allocator(Arc::new(IdAllocator::new()))
    }

    /// Creates an empty store that draws identifiers from `ids`.
    pub fn with_id_allocator(ids: Arc<IdAllocator>) -> Self {
        Self {
            assets: Arc::new(RwLock::new(RecordMap::new())),
            attachments: Arc::new(RwLock::new(RecordMap::new())),
            contents: Arc::new(RwLock::new(ContentMap::new())),
            ids,
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Copies of the assets passing `filters` and `search`, scored when searching.
    async fn select_assets(&self, selector: &AssetSelector<'_>) -> Vec<Record> {
        self.assets
            .read()
            .await
            .values()
            .filter_map(|asset| selector.select(asset))
            .collect()
    }
}

/// Applies the filter and search stages of an asset query to single records.
struct AssetSelector<'q> {
    filters: &'q [AssetFilter],
    search: Option<SearchQuery>,
}

impl<'q> AssetSelector<'q> {
    fn new(filters: &'q [AssetFilter], search: Option<&str>) -> Self {
        Self {
            filters,
            search: search.map(SearchQuery::parse),
        }
    }

    fn accepts(&self, asset: &Record) -> bool {
        RecordEvaluator::new(asset).matches_all(self.filters)
            && self
                .search
                .as_ref()
                .is_none_or(|search| search.evaluate(asset).matches)
    }

    /// Returns a copy of an accepted asset, stamped with its match score when searching.
    fn select(&self, asset: &Record) -> Option<Record> {
        if !RecordEvaluator::new(asset).matches_all(self.filters) {
            return None;
        }

        let Some(search) = &self.search else {
            return Some(asset.clone());
        };

        let result = search.evaluate(asset);
        if !result.matches {
            return None;
        }

        let mut scored = asset.clone();
        scored.insert(MATCH_SCORE_FIELD, result.score_string());

        Some(scored)
    }
}

#[async_trait]
impl AssetBackend for InMemoryStore {
    fn allocate_id(&self) -> String {
        self.ids.next_id()
    }

    async fn retrieve_all_assets(&self) -> StoreResult<Vec<Record>> {
        Ok(
            self.assets
                .read()
                .await
                .values()
                .cloned()
                .collect()
        )
    }

    async fn query_assets(&self, query: AssetQuery) -> StoreResult<Vec<Record>> {
        let selector = AssetSelector::new(&query.filters, query.search.as_deref());
        let mut results = self.select_assets(&selector).await;
        let matched = results.len();

        // Searches without an explicit sort return the best matches first
        let sort = query.sort.clone().or_else(|| {
            query
                .search
                .as_ref()
                .map(|_| SortOptions::new(MATCH_SCORE_FIELD, SortOrder::Descending))
        });

        if let Some(sort) = &sort {
            sort_records(&mut results, sort);
        }

        let mut results = paginate(results, query.pagination.as_ref());

        for result in &mut results {
            result.remove(MATCH_SCORE_FIELD);
        }

        debug!(
            filters = query.filters.len(),
            search = query.search.as_deref(),
            matched,
            returned = results.len(),
            "Queried assets"
        );

        Ok(results)
    }

    async fn count_assets(&self, filters: &[AssetFilter], search: Option<&str>) -> StoreResult<usize> {
        let selector = AssetSelector::new(filters, search);

        Ok(
            self.assets
                .read()
                .await
                .values()
                .filter(|asset| selector.accepts(asset))
                .count()
        )
    }

    async fn distinct_values(
        &self,
        field: &str,
        filters: &[AssetFilter],
        search: Option<&str>,
    ) -> StoreResult<Vec<Bson>> {
        let selector = AssetSelector::new(filters, search);
        let assets = self.assets.read().await;
        // Bson is not hashable; a linear scan keeps first-seen order
        let mut values: Vec<Bson> = Vec::new();

        for asset in assets.values().filter(|asset| selector.accepts(asset)) {
            if let Some(value) = resolve(asset, field) {
                if !values.contains(&*value) {
                    values.push(value.into_owned());
                }
            }
        }

        Ok(values)
    }

    async fn create_asset(&self, mut asset: Record) -> StoreResult<Record> {
        let id = self.ids.next_id();

        asset.remove(MATCH_SCORE_FIELD);
        asset.insert(ID_FIELD, id.as_str());

        self.assets
            .write()
            .await
            .insert(id.clone(), asset.clone());

        debug!(asset_id = %id, "Created asset");

        Ok(asset)
    }

    async fn retrieve_asset(&self, id: &str) -> StoreResult<Record> {
        self.assets
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id, ArtefactKind::Asset))
    }

    async fn update_asset(&self, id: &str, mut asset: Record) -> StoreResult<Record> {
        asset.remove(MATCH_SCORE_FIELD);
        asset.insert(ID_FIELD, id);

        let replaced = self
            .assets
            .write()
            .await
            .insert(id.to_string(), asset.clone());

        debug!(asset_id = id, existed = replaced.is_some(), "Updated asset");

        Ok(asset)
    }

    async fn delete_asset(&self, id: &str) -> StoreResult<()> {
        let removed = self.assets.write().await.remove(id);

        debug!(asset_id = id, existed = removed.is_some(), "Deleted asset");

        Ok(())
    }

    async fn create_attachment_metadata(&self, attachment: Record) -> StoreResult<Record> {
        let id = match attachment.record_id() {
            Some(id) => id.to_string(),
            None => self.ids.next_id(),
        };
        let attachment = attachment.with_id(id.as_str());

        self.attachments
            .write()
            .await
            .insert(id.clone(), attachment.clone());

        debug!(
            attachment_id = %id,
            asset_id = attachment.get(ASSET_ID_FIELD).and_then(Bson::as_str),
            "Created attachment metadata"
        );

        Ok(attachment)
    }

    async fn retrieve_attachment_metadata(&self, id: &str) -> StoreResult<Record> {
        self.attachments
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id, ArtefactKind::Attachment))
    }

    async fn delete_attachment_metadata(&self, id: &str) -> StoreResult<()> {
        let removed = self.attachments.write().await.remove(id);

        debug!(attachment_id = id, existed = removed.is_some(), "Deleted attachment metadata");

        Ok(())
    }

    async fn find_attachments_for_asset(&self, asset_id: &str) -> StoreResult<Vec<Record>> {
        Ok(
            self.attachments
                .read()
                .await
                .values()
                .filter(|attachment| {
                    attachment.get(ASSET_ID_FIELD).and_then(Bson::as_str) == Some(asset_id)
                })
                .cloned()
                .collect()
        )
    }

    async fn create_attachment_content(
        &self,
        name: &str,
        content_type: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StoreResult<AttachmentContentMetadata> {
        let mut buffer = Vec::new();
        content.read_to_end(&mut buffer).await?;

        let id = self.ids.next_id();
        let length = buffer.len();

        self.contents.write().await.insert(
            id.clone(),
            StoredContent {
                name: name.to_string(),
                content_type: content_type.to_string(),
                content: Arc::from(buffer),
            },
        );

        debug!(content_id = %id, name, content_type, length, "Stored attachment content");

        Ok(AttachmentContentMetadata { id, length })
    }

    async fn retrieve_attachment_content(&self, id: &str) -> StoreResult<AttachmentContentResponse> {
        self.contents
            .read()
            .await
            .get(id)
            .map(|stored| AttachmentContentResponse {
                name: stored.name.clone(),
                content_type: stored.content_type.clone(),
                content: Arc::clone(&stored.content),
            })
            .ok_or_else(|| StoreError::not_found(id, ArtefactKind::AttachmentContent))
    }

    async fn delete_attachment_content(&self, id: &str) -> StoreResult<()> {
        let removed = self.contents.write().await.remove(id);

        debug!(content_id = id, existed = removed.is_some(), "Deleted attachment content");

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use assetlayer_memory::InMemoryStore;
/// use assetlayer::backend::AssetBackendBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::builder()
///         .ids_starting_after(1000)
///         .build()
///         .await
///         .unwrap();
/// }
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    ids: Option<Arc<IdAllocator>>,
}

impl InMemoryStoreBuilder {
    /// Shares an existing allocator, e.g. between several stores in one process.
    pub fn id_allocator(mut self, ids: Arc<IdAllocator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Starts the store's own allocator after `last`.
    pub fn ids_starting_after(mut self, last: u64) -> Self {
        self.ids = Some(Arc::new(IdAllocator::starting_after(last)));
        self
    }
}

#[async_trait]
impl AssetBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::with_id_allocator(self.ids.unwrap_or_default()))
    }
}
