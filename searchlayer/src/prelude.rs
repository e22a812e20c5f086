//! Convenient re-exports of commonly used types from searchlayer.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use searchlayer::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document and search-model contracts (including the derive)
//! - Predicate, sort, and pagination types
//! - Backend traits, the searcher facade, and the batch writer
//! - Error types

pub use searchlayer_core::{
    backend::{SearchBackend, SearchBackendBuilder, SearchPlan},
    batch::{BatchOutcome, BatchWriter, BulkReport},
    document::{Document, DocumentExt},
    error::{SearchError, SearchResult},
    field::{FieldDescriptor, FieldKind, MatchMode},
    model::{DateRange, FieldValue, NumberRange, SearchRequest, Searchable, TimeRange},
    page::{Page, Window},
    query::{Bounds, Clause, Match, Predicate, PredicateVisitor, Projection, compile},
    searcher::{ResultMapper, SearchOutcome, Searcher, SearcherBuilder},
    sort::{SortDirection, SortKey, SortSpec, parse_sort},
};

pub use searchlayer_macros::Searchable;
