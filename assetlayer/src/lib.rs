//! Asset catalog storage with an in-memory document query engine.
//!
//! This crate is the primary entry point of the assetlayer project. It re-exports the storage
//! contract and shared types from `assetlayer-core`, the in-memory backend from
//! `assetlayer-memory`, and adds configuration and logging setup for servers embedding the
//! store.
//!
//! # Features
//!
//! - **Untyped records** - Assets and attachments are BSON documents with a few reserved
//!   attributes
//! - **Flexible querying** - AND-combined filters on nested paths, free-text search with
//!   relevance ordering, sorting and pagination
//! - **Attachments** - Metadata records plus binary content uploaded from async streams
//! - **Pluggable backends** - Everything goes through the `AssetBackend` trait
//!
//! # Quick Start
//!
//! ```ignore
//! use assetlayer::{prelude::*, config::StoreConfig};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::load()?;
//!     assetlayer::logging::init_tracing(&config.log_filter);
//!
//!     let store = assetlayer::open_store(&config).await?;
//!
//!     store.create_asset(doc! { "name": "Liberty Core", "type": "feature" }).await?;
//!
//!     let page = store
//!         .query_page(
//!             AssetQuery::builder()
//!                 .filter(AssetFilter::eq("type", "feature"))
//!                 .search("liberty")
//!                 .paginate(0, 20)
//!                 .build(),
//!         )
//!         .await?;
//!
//!     println!("{} of {} assets", page.items.len(), page.count);
//!
//!     store.shutdown().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! A typed store can be turned into a [`DynAssetStore`](store::DynAssetStore) when the backend
//! is chosen at runtime, and converted back with `into_static`.
//!
//! ```ignore
//! let dyn_store = store.into_dyn();
//! let asset = dyn_store.as_store().retrieve_asset(&id).await?;
//! let store = dyn_store.into_static::<InMemoryStore>().unwrap();
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing

pub mod config;
pub mod logging;
pub mod prelude;

pub use assetlayer_core::{attachment, backend, error, page, query, record, store};

// Re-export BSON types for convenience
pub use bson;

use assetlayer_core::{backend::AssetBackendBuilder, error::StoreResult, store::AssetStore};

use crate::config::StoreConfig;

/// In-memory storage backend implementations.
pub mod memory {
    pub use assetlayer_memory::{IdAllocator, InMemoryStore, InMemoryStoreBuilder};
    pub use assetlayer_memory::search::{MATCH_SCORE_FIELD, SEARCH_FIELDS};
}

/// Builds an in-memory asset store as described by `config`.
pub async fn open_store(config: &StoreConfig) -> StoreResult<AssetStore<memory::InMemoryStore>> {
    let backend = memory::InMemoryStore::builder()
        .ids_starting_after(config.id_start)
        .build()
        .await?;

    tracing::debug!(id_start = config.id_start, "Opened in-memory asset store");

    Ok(AssetStore::new(backend))
}
