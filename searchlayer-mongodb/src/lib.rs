//! MongoDB backend for the searchlayer project.
//!
//! Implements [`SearchBackend`] on top of the official MongoDB driver:
//! compiled predicates translate to native filter documents, pages execute
//! as `find` with projection/sort/skip/limit, totals come from
//! `countDocuments`, and batches go out as one unordered client bulk write
//! whose write-error report maps back to per-record indices.
//!
//! Sibling components for MongoDB deployments live here too: the
//! [`GeoPointMapper`] post-fetch transform and the [`MongoHealthProbe`]
//! liveness check.
//!
//! [`SearchBackend`]: searchlayer_core::backend::SearchBackend

#[allow(unused_extern_crates)]
extern crate self as searchlayer_mongodb;

mod geo;
mod health;
mod query;
mod sanitizer;
mod store;

pub use geo::{GeoPoint, GeoPointMapper};
pub use health::MongoHealthProbe;
pub use store::{MongoDbStore, MongoDbStoreBuilder};
