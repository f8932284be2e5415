//! Storage contract and shared types for an asset catalog server.
//!
//! This crate is the core of the assetlayer project and provides:
//!
//! - **Records** ([`record`]) - Untyped asset and attachment records and JSON conversion
//! - **Attachments** ([`attachment`]) - Types describing stored attachment content
//! - **Store backend abstraction** ([`backend`]) - The storage contract implemented by backends
//! - **Query API** ([`query`]) - Filters, search, sorting and pagination for asset queries
//! - **Asset store** ([`store`]) - Facade over a backend with composite operations
//! - **Error handling** ([`error`]) - Error and result types
//! - **Pagination** ([`page`]) - Offset/limit slicing and result pages
//!
//! # Example
//!
//! ```ignore
//! use assetlayer::{store::AssetStore, memory::InMemoryStore};
//! use bson::doc;
//!
//! let store = AssetStore::new(InMemoryStore::new());
//! let asset = store.create_asset(doc! { "name": "Liberty Core" }).await?;
//! ```

pub mod attachment;
pub mod backend;
pub mod error;
pub mod page;
pub mod query;
pub mod record;
pub mod store;
