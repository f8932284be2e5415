//! In-memory asset storage backend for assetlayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `AssetBackend` trait,
//! together with the query engine it runs on. It is intended for development, testing and
//! small catalogs.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLocks
//! - **Untyped records** - Assets and attachments are stored as BSON documents
//! - **Full query support** - Filters on nested paths, free-text search with scoring, sorting
//!   and pagination
//! - **Attachment content** - Uploaded bytes are kept in memory and shared on retrieval
//!
//! # Quick Start
//!
//! ```ignore
//! use assetlayer::{store::AssetStore, query::{AssetQuery, AssetFilter}, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = AssetStore::new(InMemoryStore::new());
//!
//!     store.create_asset(doc! { "name": "Liberty Core", "type": "feature" }).await?;
//!
//!     let features = store
//!         .query_assets(
//!             AssetQuery::builder()
//!                 .filter(AssetFilter::eq("type", "feature"))
//!                 .search("liberty")
//!                 .build(),
//!         )
//!         .await?;
//!
//!     assert_eq!(features.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod evaluator;
pub mod id;
pub mod ordering;
pub mod search;
pub mod store;

pub use id::IdAllocator;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
