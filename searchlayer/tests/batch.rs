//! End-to-end batch-write tests: bulk update → report → reconciled outcome.

use bson::Uuid;
use serde::{Deserialize, Serialize};

use searchlayer::{memory::InMemoryStore, prelude::*};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Counter {
    id: Uuid,
    value: i64,
}

impl Document for Counter {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "counters"
    }
}

async fn seeded_store(counters: &[Counter]) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_documents(
            counters
                .iter()
                .map(|counter| (*counter.id(), counter.to_bson().unwrap()))
                .collect(),
            Counter::collection_name(),
        )
        .await;
    store
}

fn counters(count: usize) -> Vec<Counter> {
    (0..count)
        .map(|value| Counter {
            id: Uuid::new(),
            value: value as i64,
        })
        .collect()
}

#[tokio::test]
async fn full_success_marks_every_record() {
    let batch = counters(3);
    let store = seeded_store(&batch).await;
    let writer = BatchWriter::for_document::<Counter>(store);

    let updated: Vec<Counter> = batch
        .iter()
        .map(|counter| Counter {
            id: counter.id,
            value: counter.value + 100,
        })
        .collect();
    let outcome = writer.write(&updated).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.succeeded, [0, 1, 2]);
    assert_eq!(outcome.rejection, None);
}

#[tokio::test]
async fn unknown_record_fails_only_its_index() {
    let batch = counters(4);
    let store = seeded_store(&batch).await;
    let writer = BatchWriter::for_document::<Counter>(store.clone());

    let mut updated = batch.clone();
    updated[2] = Counter {
        id: Uuid::new(),
        value: -1,
    };
    let outcome = writer.write(&updated).await.unwrap();

    assert_eq!(outcome.failed, [2]);
    assert_eq!(outcome.succeeded, [0, 1, 3]);

    // The union of the two sets covers the whole batch exactly once.
    let mut union: Vec<usize> = outcome
        .succeeded
        .iter()
        .chain(outcome.failed.iter())
        .copied()
        .collect();
    union.sort_unstable();
    assert_eq!(union, [0, 1, 2, 3]);
}

#[tokio::test]
async fn applied_records_are_visible_after_partial_failure() {
    let batch = counters(2);
    let store = seeded_store(&batch).await;
    let writer = BatchWriter::for_document::<Counter>(store.clone());

    let updated = vec![
        Counter {
            id: batch[0].id,
            value: 42,
        },
        Counter {
            id: Uuid::new(),
            value: -1,
        },
    ];
    let outcome = writer.write(&updated).await.unwrap();
    assert_eq!(outcome.failed, [1]);

    let survivors = store
        .count_documents(&Predicate::new(), Counter::collection_name())
        .await
        .unwrap();
    assert_eq!(survivors, 2);
}

#[tokio::test]
async fn unstructured_failure_fails_the_whole_batch() {
    let batch = counters(3);
    let store = seeded_store(&batch).await;
    let writer: BatchWriter<InMemoryStore> = BatchWriter::new(store, "nowhere");

    let outcome = writer.write(&batch).await.unwrap();
    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.failed, [0, 1, 2]);
    assert!(outcome.rejection.is_some());
}

#[tokio::test]
async fn empty_batch_is_trivially_complete() {
    let store = seeded_store(&[]).await;
    let writer = BatchWriter::for_document::<Counter>(store);
    let outcome = writer.write::<Counter>(&[]).await.unwrap();
    assert!(outcome.is_complete());
    assert!(outcome.succeeded.is_empty());
}
