//! In-memory search backend.
//!
//! Stores documents as BSON values in per-collection maps behind an
//! async-aware read-write lock. Filtering scans every document in the
//! collection, sorting is a stable multi-key sort, and the natural order of
//! a collection is its id order (a `BTreeMap` keyed by id string), so
//! unsorted paging is deterministic. Intended for development and tests.

use std::{cmp::Ordering, collections::BTreeMap, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Uuid};
use mea::rwlock::RwLock;
use tracing::debug;

use searchlayer_core::{
    backend::{SearchBackend, SearchBackendBuilder, SearchPlan},
    batch::BulkReport,
    error::SearchResult,
    query::{Predicate, Projection},
    sort::{SortDirection, SortSpec},
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type CollectionMap = BTreeMap<String, Bson>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory search backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones share the same underlying data across async tasks.
///
/// Bulk updates require the target record to exist: unknown ids are reported
/// as per-index failures, and an unknown collection rejects the whole batch.
/// This gives callers the same partial-failure surface a real store produces.
///
/// # Example
///
/// ```ignore
/// use searchlayer_memory::InMemoryStore;
/// use bson::{Uuid, Bson, doc};
///
/// let store = InMemoryStore::new();
/// let id = Uuid::new();
/// store.insert_documents(vec![(id, Bson::Document(doc! { "name": "Alice" }))], "users").await;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Inserts documents, creating the collection on first use and
    /// overwriting existing documents with the same ids.
    pub async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) {
        let mut store = self.store.write().await;
        let collection_map = store.entry(collection.to_string()).or_default();

        for (id, document) in documents {
            collection_map.insert(id.to_string(), document);
        }
    }

    /// Removes a whole collection.
    pub async fn drop_collection(&self, collection: &str) {
        self.store.write().await.remove(collection);
    }

    async fn filtered(&self, predicate: &Predicate, collection: &str) -> SearchResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched = Vec::new();
        for document in collection_map.values() {
            if DocumentEvaluator::new(document).matches(predicate)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }
}

fn compare_documents(left: &Bson, right: &Bson, sort: &SortSpec) -> Ordering {
    for key in sort.keys() {
        let field = |document: &Bson| -> Option<Bson> {
            document
                .as_document()
                .and_then(|document| document.get(&key.column))
                .cloned()
        };
        let (left_field, right_field) = (field(left), field(right));

        let ordering = match (&left_field, &right_field) {
            (Some(left_field), Some(right_field)) => Comparable::from(left_field)
                .partial_cmp(&Comparable::from(right_field))
                .unwrap_or(Ordering::Equal),
            (None, None) => Ordering::Equal,
            // Missing fields sort first, like the store's null ordering.
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        };
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

fn project(document: Bson, projection: &Projection) -> Bson {
    if projection.is_empty() {
        return document;
    }

    match document {
        Bson::Document(body) => Bson::Document(
            body.into_iter()
                .filter(|(key, _)| projection.columns().iter().any(|column| column == key))
                .collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl SearchBackend for InMemoryStore {
    async fn query_documents(
        &self,
        plan: SearchPlan,
        collection: &str,
    ) -> SearchResult<Vec<Bson>> {
        let mut matched = self.filtered(&plan.predicate, collection).await?;

        if !plan.sort.is_empty() {
            matched.sort_by(|left, right| compare_documents(left, right, &plan.sort));
        }

        debug!(
            collection,
            matched = matched.len(),
            skip = plan.window.skip,
            limit = plan.window.limit,
            "memory query"
        );

        Ok(matched
            .into_iter()
            .skip(plan.window.skip as usize)
            .take(plan.window.limit as usize)
            .map(|document| project(document, &plan.projection))
            .collect())
    }

    async fn count_documents(
        &self,
        predicate: &Predicate,
        collection: &str,
    ) -> SearchResult<u64> {
        Ok(self.filtered(predicate, collection).await?.len() as u64)
    }

    async fn update_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> BulkReport {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return BulkReport::Rejected(format!("collection not found: {collection}"));
        };

        let mut failed = Vec::new();
        for (index, (id, document)) in documents.into_iter().enumerate() {
            let key = id.to_string();
            if collection_map.contains_key(&key) {
                collection_map.insert(key, document);
            } else {
                failed.push(index);
            }
        }

        if failed.is_empty() {
            BulkReport::Complete
        } else {
            BulkReport::PartialFailure(failed)
        }
    }
}

/// Builder for [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl SearchBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> SearchResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
