use async_trait::async_trait;
use bson::{Bson, Document, Uuid, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, Namespace,
    error::ErrorKind,
    options::{ClientOptions, FindOptions, UpdateOneModel, WriteModel},
};
use tracing::{debug, warn};

use searchlayer_core::{
    backend::{SearchBackend, SearchBackendBuilder, SearchPlan},
    batch::BulkReport,
    error::{SearchError, SearchResult},
    query::Predicate,
};

use crate::{
    query::{filter_document, projection_document, sort_document},
    sanitizer::{restore_value, sanitize_string, sanitize_value},
};

/// MongoDB-backed [`SearchBackend`].
///
/// Fetches pages with `find` (filter, projection, sort, skip, limit), counts
/// with `countDocuments` over the same filter, and applies batches as one
/// client-level unordered bulk write so every record is attempted and the
/// server's write-error report covers the whole batch.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// The client handle, for wiring sibling components such as the health probe.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The database name this store operates on.
    pub fn database(&self) -> &str {
        &self.database
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&sanitize_string(collection_name))
    }

    fn prepare_document(&self, id: &Uuid, document: &Bson) -> SearchResult<Document> {
        Ok(Document::from_iter(
            sanitize_value(document)
                .as_document()
                .cloned()
                .ok_or_else(|| SearchError::Serialization("Expected document".into()))?
                .into_iter()
                .chain(vec![("_id".to_string(), (*id).into())]),
        ))
    }

    fn restore_document(&self, document: &Document) -> Bson {
        restore_value(&Bson::Document(Document::from_iter(
            document
                .clone()
                .into_iter()
                .filter(|(key, _)| key != "_id"),
        )))
    }
}

#[async_trait]
impl SearchBackend for MongoDbStore {
    async fn query_documents(
        &self,
        plan: SearchPlan,
        collection: &str,
    ) -> SearchResult<Vec<Bson>> {
        let mut options = FindOptions::default();
        options.skip = Some(plan.window.skip);
        options.limit = Some(plan.window.limit as i64);
        options.projection = projection_document(&plan.projection);
        options.sort = sort_document(&plan.sort);

        debug!(
            collection,
            skip = plan.window.skip,
            limit = plan.window.limit,
            "mongodb find"
        );

        Ok(self
            .get_collection(collection)
            .find(filter_document(&plan.predicate)?)
            .with_options(options)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?
            .iter()
            .map(|document| self.restore_document(document))
            .collect())
    }

    async fn count_documents(
        &self,
        predicate: &Predicate,
        collection: &str,
    ) -> SearchResult<u64> {
        self.get_collection(collection)
            .count_documents(filter_document(predicate)?)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))
    }

    async fn update_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> BulkReport {
        let namespace = Namespace {
            db: self.database.clone(),
            coll: sanitize_string(collection),
        };

        let mut models = Vec::with_capacity(documents.len());
        for (id, document) in &documents {
            let body = match self.prepare_document(id, document) {
                Ok(body) => body,
                // The batch never reached the server; nothing was applied.
                Err(err) => return BulkReport::Rejected(err.to_string()),
            };
            models.push(WriteModel::UpdateOne(
                UpdateOneModel::builder()
                    .namespace(namespace.clone())
                    .filter(doc! { "_id": *id })
                    .update(doc! { "$set": body })
                    .build(),
            ));
        }

        match self.client.bulk_write(models).ordered(false).await {
            Ok(_) => BulkReport::Complete,
            Err(err) => match err.kind.as_ref() {
                ErrorKind::BulkWrite(failure) => {
                    let mut indices: Vec<usize> =
                        failure.write_errors.keys().copied().collect();
                    indices.sort_unstable();
                    warn!(collection, failed = indices.len(), "bulk write partially failed");
                    BulkReport::PartialFailure(indices)
                }
                _ => BulkReport::Rejected(err.to_string()),
            },
        }
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl SearchBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> SearchResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| SearchError::Initialization(e.to_string()))?,
            )
            .map_err(|e| SearchError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
