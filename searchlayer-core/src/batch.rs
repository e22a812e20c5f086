//! Bulk-write outcome reconciliation.
//!
//! A batch of records goes to the store as one bulk update; the store's
//! report comes back as a closed [`BulkReport`] variant. Reconciliation
//! turns that report into the two per-record index sets callers act on:
//! which records landed and which did not. The conservative rule is fixed:
//! when the store returns no structured per-index detail, the whole batch
//! counts as failed.

use bson::Uuid;
use tracing::warn;

use crate::{
    backend::SearchBackend,
    document::{Document, DocumentExt},
    error::SearchResult,
};

/// The store's accounting of one bulk update.
///
/// Consumed exhaustively by [`BulkReport::reconcile`]; there is no
/// open-ended error fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkReport {
    /// Every record in the batch was applied.
    Complete,
    /// The records at these indices failed; all others were applied.
    /// Indices are kept in the order the store reported them.
    PartialFailure(Vec<usize>),
    /// The batch produced no structured per-index detail; nothing can be
    /// assumed to have been applied.
    Rejected(String),
}

impl BulkReport {
    /// Reconciles this report against a batch of `len` records.
    ///
    /// The result always satisfies: `succeeded ∪ failed = [0, len)` with the
    /// two sets disjoint.
    pub fn reconcile(self, len: usize) -> BatchOutcome {
        match self {
            BulkReport::Complete => BatchOutcome {
                succeeded: (0..len).collect(),
                failed: Vec::new(),
                rejection: None,
            },
            BulkReport::PartialFailure(failed) => {
                let succeeded = (0..len)
                    .filter(|index| !failed.contains(index))
                    .collect();
                BatchOutcome {
                    succeeded,
                    failed,
                    rejection: None,
                }
            }
            BulkReport::Rejected(reason) => BatchOutcome {
                succeeded: Vec::new(),
                failed: (0..len).collect(),
                rejection: Some(reason),
            },
        }
    }
}

/// Per-record outcome of one bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Indices of records that were applied, in ascending order.
    pub succeeded: Vec<usize>,
    /// Indices of records that failed, in the order the store reported them.
    pub failed: Vec<usize>,
    /// The store's reason when the batch was rejected without per-index detail.
    pub rejection: Option<String>,
}

impl BatchOutcome {
    /// Returns `true` if every record in the batch was applied.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes typed record batches through a backend and reconciles the outcome.
#[derive(Debug)]
pub struct BatchWriter<B: SearchBackend> {
    backend: B,
    collection: String,
}

impl<B: SearchBackend> BatchWriter<B> {
    /// Creates a writer for the given collection.
    pub fn new(backend: B, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }

    /// Creates a writer targeting a document type's own collection.
    pub fn for_document<D: Document>(backend: B) -> Self {
        Self::new(backend, D::collection_name())
    }

    /// Submits the batch as one bulk update and reconciles the store's report.
    ///
    /// Retries are deliberately absent; a caller wanting them wraps the
    /// whole call.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a record cannot be encoded — the
    /// batch never reaches the store in that case. Store-side failure is not
    /// an `Err`: it is reported through the outcome's index sets.
    pub async fn write<D: Document>(&self, records: &[D]) -> SearchResult<BatchOutcome> {
        let documents = records
            .iter()
            .map(|record| record.to_bson().map(|body| (*record.id(), body)))
            .collect::<SearchResult<Vec<(Uuid, bson::Bson)>>>()?;

        let report = self
            .backend
            .update_documents(documents, &self.collection)
            .await;
        if report != BulkReport::Complete {
            warn!(collection = %self.collection, ?report, "bulk update did not fully apply");
        }

        Ok(report.reconcile(records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn complete_report_marks_every_index_succeeded() {
        let outcome = BulkReport::Complete.reconcile(5);
        assert_eq!(outcome.succeeded, [0, 1, 2, 3, 4]);
        assert!(outcome.failed.is_empty());
        assert!(outcome.is_complete());
    }

    #[test]
    fn partial_failure_splits_the_batch() {
        let outcome = BulkReport::PartialFailure(vec![1, 3]).reconcile(5);
        assert_eq!(outcome.succeeded, [0, 2, 4]);
        assert_eq!(outcome.failed, [1, 3]);
        assert_eq!(outcome.rejection, None);
    }

    #[test]
    fn rejection_fails_the_whole_batch() {
        let outcome = BulkReport::Rejected("connection reset".to_string()).reconcile(5);
        assert!(outcome.succeeded.is_empty());
        assert_eq!(outcome.failed, [0, 1, 2, 3, 4]);
        assert_eq!(outcome.rejection.as_deref(), Some("connection reset"));
    }

    #[test]
    fn failed_indices_keep_store_order() {
        let outcome = BulkReport::PartialFailure(vec![4, 0]).reconcile(5);
        assert_eq!(outcome.failed, [4, 0]);
        assert_eq!(outcome.succeeded, [1, 2, 3]);
    }

    #[test]
    fn empty_batch_reconciles_to_empty_sets() {
        let outcome = BulkReport::Complete.reconcile(0);
        assert!(outcome.succeeded.is_empty());
        assert!(outcome.failed.is_empty());
    }

    proptest! {
        // Every reconciliation covers [0, len) exactly once across the two sets.
        #[test]
        fn reconciliation_partitions_the_batch(
            len in 0usize..64,
            failures in proptest::collection::btree_set(0usize..64, 0..16),
        ) {
            let failed: Vec<usize> = failures.into_iter().filter(|index| *index < len).collect();
            let outcome = BulkReport::PartialFailure(failed).reconcile(len);

            let mut union: Vec<usize> = outcome
                .succeeded
                .iter()
                .chain(outcome.failed.iter())
                .copied()
                .collect();
            union.sort_unstable();
            prop_assert_eq!(union, (0..len).collect::<Vec<usize>>());
        }
    }
}
