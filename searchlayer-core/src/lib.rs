//! A model-driven search layer over document stores.
//!
//! This crate is the core of the searchlayer project and provides:
//!
//! - **Search-model contract** ([`model`]) - The [`Searchable`](model::Searchable) trait,
//!   value shapes, and the nested pagination/sort directive
//! - **Field descriptors** ([`field`]) - Static per-model-type field metadata and resolution
//! - **Predicate compilation** ([`query`]) - Turning a model value into a filter predicate
//!   and projection, with a visitor for backend translation
//! - **Sort compilation** ([`sort`]) - Parsing sort expressions into ordered column lists
//! - **Pagination** ([`page`]) - Window math (with first-page override) and result pages
//! - **Backend abstraction** ([`backend`]) - The minimal store surface the layer drives
//! - **Search facade** ([`searcher`]) - Compile, execute, count, post-process
//! - **Batch reconciliation** ([`batch`]) - Bulk-write outcomes as per-record index sets
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use searchlayer_core::prelude::*;
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Uuid,
//!     pub name: String,
//! }
//!
//! impl Document for User {
//!     fn id(&self) -> &Uuid {
//!         &self.id
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as searchlayer_core;

pub mod backend;
pub mod batch;
pub mod document;
pub mod error;
pub mod field;
pub mod model;
pub mod page;
pub mod query;
pub mod searcher;
pub mod sort;
