//! Main searchlayer crate providing model-driven search over document stores.
//!
//! This crate is the primary entry point for users of the searchlayer
//! framework. It re-exports the core types, the `Searchable` derive, and the
//! storage backends.
//!
//! # Features
//!
//! - **Declarative search models** - Describe filter shape, sort, and paging
//!   with a plain struct; the layer compiles it to a store-native query
//! - **Paginated execution** - One fetch plus an independent total count per
//!   call, with a first-page-size override
//! - **Batch writes** - One bulk round trip per batch, with per-record
//!   success/failure reconciliation
//! - **Multiple backends** - In-memory for development and tests, MongoDB
//!   behind the `mongodb` feature
//!
//! # Quick Start
//!
//! ```ignore
//! use searchlayer::{prelude::*, memory::InMemoryStore};
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Uuid,
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! impl Document for User {
//!     fn id(&self) -> &Uuid { &self.id }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! #[derive(Default, Searchable)]
//! pub struct UserFilter {
//!     pub request: SearchRequest,
//!     #[search(matches = "prefix")]
//!     pub name: Option<String>,
//!     #[search(keyword = "contain")]
//!     pub email: Option<String>,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryStore::new();
//!
//!     // Seed the store, then search it.
//!     let searcher: Searcher<_, UserFilter, User> = Searcher::builder(store).build();
//!
//!     let filter = UserFilter {
//!         request: SearchRequest::new(1, 20).with_sort("-name"),
//!         name: Some("al".to_string()),
//!         ..UserFilter::default()
//!     };
//!
//!     let outcome = searcher.search(&filter).await.unwrap();
//!     println!("{} of {} users", outcome.items.len(), outcome.total);
//! }
//! ```
//!
//! # Batch writes
//!
//! ```ignore
//! use searchlayer::prelude::*;
//!
//! # async fn example(store: searchlayer::memory::InMemoryStore, users: Vec<User>) {
//! let writer = BatchWriter::for_document::<User>(store);
//! let outcome = writer.write(&users).await.unwrap();
//! println!("applied {:?}, failed {:?}", outcome.succeeded, outcome.failed);
//! # }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory backend for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use searchlayer_core::{
    backend, batch, document, error, field, model, page, query, searcher, sort,
};

pub use searchlayer_macros::Searchable;

// Re-export BSON types for convenience
pub use bson;

/// In-memory backend implementations.
pub mod memory {
    pub use searchlayer_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use searchlayer_mongodb::{GeoPoint, GeoPointMapper, MongoDbStore, MongoDbStoreBuilder, MongoHealthProbe};
}
