//! Storage backend abstraction for the search layer.
//!
//! The core treats the document store as an opaque engine that can fetch a
//! filtered, projected, sorted, skip/limited page of documents, count the
//! documents matching a filter, and apply one bulk update with a structured
//! partial-failure report. [`SearchBackend`] captures exactly that surface;
//! everything else (wire protocol, connection management, BSON encoding)
//! belongs to the backend implementation.
//!
//! # Concurrency and cancellation
//!
//! Implementations must be thread-safe (`Send + Sync`); the core issues no
//! parallel calls of its own — a search is one fetch followed by one count.
//! All methods are plain `async fn`s: dropping the returned future abandons
//! the round trip, so cancellation and timeouts stay entirely with the
//! caller's invocation context.

use async_trait::async_trait;
use bson::{Bson, Uuid};
use std::fmt::Debug;

use crate::{
    batch::BulkReport,
    error::SearchResult,
    page::Window,
    query::{Predicate, Projection},
    sort::SortSpec,
};

/// A fully compiled search: filter, projection, sort, and pagination window.
///
/// Built by the facade from a search model and handed to the backend as one
/// unit; the backend translates each part into its native query options.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    /// The filter predicate; empty matches every document.
    pub predicate: Predicate,
    /// The columns to return; empty returns all columns.
    pub projection: Projection,
    /// The sort specification; empty leaves store default order.
    pub sort: SortSpec,
    /// The skip/limit window for the requested page.
    pub window: Window,
}

/// Abstract interface for document-store backends.
///
/// Operations return [`SearchResult`] except the bulk update, whose outcome
/// is always a [`BulkReport`]: the report is a total accounting of the
/// batch (complete, partially failed with indices, or rejected wholesale)
/// and is reconciled into per-record outcomes by the caller.
#[async_trait]
pub trait SearchBackend: Send + Sync + Debug {
    /// Fetches one page of documents matching the plan.
    ///
    /// Applies the plan's predicate, projection, sort, and window. Result
    /// order follows the sort specification; with an empty specification the
    /// store's default order applies.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`](crate::error::SearchError) if the fetch fails.
    async fn query_documents(
        &self,
        plan: SearchPlan,
        collection: &str,
    ) -> SearchResult<Vec<Bson>>;

    /// Counts all documents matching the predicate, ignoring pagination.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`](crate::error::SearchError) if the count fails.
    async fn count_documents(&self, predicate: &Predicate, collection: &str)
    -> SearchResult<u64>;

    /// Applies one bulk update of `(id, document)` pairs in a single round trip.
    ///
    /// Every record must be accounted for in the returned report: a store
    /// that cannot produce per-index failure detail must report
    /// [`BulkReport::Rejected`], never a partial guess.
    async fn update_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str)
    -> BulkReport;
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait SearchBackendBuilder {
    type Backend: SearchBackend;

    async fn build(self) -> SearchResult<Self::Backend>;
}
