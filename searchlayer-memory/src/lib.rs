//! In-memory backend for the searchlayer project.
//!
//! Provides [`InMemoryStore`], a fully functional [`SearchBackend`]
//! (filtering, sorting, pagination windows, projections, bulk updates with
//! structured partial-failure reports) that operates entirely in memory.
//! Queries scan the whole collection, so this backend is intended for
//! development and tests rather than large datasets.
//!
//! [`SearchBackend`]: searchlayer_core::backend::SearchBackend

#[allow(unused_extern_crates)]
extern crate self as searchlayer_memory;

mod evaluator;
mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
