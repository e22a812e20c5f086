//! The search facade: compile, execute, paginate, post-process.
//!
//! A [`Searcher`] binds one search-model type and one result type to a
//! backend and a collection. Each call compiles the model into a
//! [`SearchPlan`], issues the page fetch and the independent total count,
//! and optionally runs a post-fetch mapping transform over the page.
//!
//! Failure semantics are asymmetric by design:
//!
//! - extraction or fetch failure aborts the call — no results, hard error;
//! - count failure still returns the fetched page, with a zero total and
//!   the count error surfaced as a warning ("the count is unreliable");
//! - mapping failure still returns the page, transformed in place up to the
//!   failing document, with the mapping error surfaced as a warning.

use std::{fmt, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use bson::Bson;
use tracing::{debug, warn};

use crate::{
    backend::{SearchBackend, SearchPlan},
    document::{Document, DocumentExt},
    error::{SearchError, SearchResult},
    model::{SearchRequest, Searchable},
    page::Page,
    query::{Predicate, Projection, compile},
    sort::{SortSpec, parse_sort},
};

/// Optional post-fetch transform applied to each fetched document.
///
/// Mappers run after the fetch and the count, before deserialization into
/// the result type; they are used to inject derived fields (for example,
/// flattening a store-native geo representation into latitude/longitude
/// columns). Transforms mutate the document in place so a failing mapper
/// leaves the document fetched-but-untransformed rather than dropped.
#[async_trait]
pub trait ResultMapper: Send + Sync {
    /// Transforms one fetched document in place.
    async fn map(&self, document: &mut Bson) -> SearchResult<()>;
}

/// Pluggable extraction of the pagination/sort directive from a model.
pub type Extractor<M> = for<'a> fn(&'a M) -> SearchResult<&'a SearchRequest>;

/// The default extractor: the model's embedded [`SearchRequest`].
///
/// A model without one fails the call — there is no fallback to default
/// pagination.
pub fn extract_request<M: Searchable>(model: &M) -> SearchResult<&SearchRequest> {
    model.request().ok_or_else(|| {
        SearchError::Extraction(
            "cannot extract sort, page index, page size, first page size from model".to_string(),
        )
    })
}

/// The result of one search call.
///
/// `warning` carries a count or mapping degradation; the items themselves
/// are valid whenever the call returns `Ok`.
#[derive(Debug)]
pub struct SearchOutcome<T> {
    /// The fetched (and possibly transformed) page of results.
    pub items: Vec<T>,
    /// Total count of records matching the filter; zero when the count failed.
    pub total: u64,
    /// Count or mapping failure, if any. Treat the total as unreliable when set.
    pub warning: Option<SearchError>,
}

impl<T> SearchOutcome<T> {
    /// Converts the outcome into a navigable [`Page`].
    pub fn into_page(self, request: &SearchRequest) -> Page<T> {
        Page::from_results(self.items, self.total, request)
    }
}

/// Binds a search-model type to a backend, a collection, and the compile /
/// sort / extraction functions, exposing a single [`Searcher::search`] entry
/// point.
///
/// # Type Parameters
///
/// * `B` - The storage backend type
/// * `M` - The search-model type
/// * `D` - The result document type
pub struct Searcher<B: SearchBackend, M: Searchable, D: Document> {
    backend: B,
    collection: String,
    build_query: fn(&M) -> (Predicate, Projection),
    build_sort: fn(&str) -> SortSpec,
    extract: Extractor<M>,
    mapper: Option<Arc<dyn ResultMapper>>,
    _marker: PhantomData<fn() -> D>,
}

impl<B: SearchBackend, M: Searchable, D: Document> fmt::Debug for Searcher<B, M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("backend", &self.backend)
            .field("collection", &self.collection)
            .field("mapper", &self.mapper.as_ref().map(|_| "…"))
            .finish()
    }
}

impl<B: SearchBackend, M: Searchable, D: Document> Searcher<B, M, D> {
    /// Creates a builder binding the backend to the result type's collection.
    pub fn builder(backend: B) -> SearcherBuilder<B, M, D> {
        SearcherBuilder::new(backend)
    }

    /// Executes one search call.
    ///
    /// # Errors
    ///
    /// Returns an extraction error when the model carries no pagination/sort
    /// directive, a fetch error when the page query fails, and a
    /// serialization error when a fetched document does not deserialize into
    /// `D`. Count and mapping failures do not fail the call; they surface in
    /// [`SearchOutcome::warning`].
    pub async fn search(&self, model: &M) -> SearchResult<SearchOutcome<D>> {
        let request = (self.extract)(model)?;
        let (predicate, projection) = (self.build_query)(model);
        let sort = (self.build_sort)(&request.sort);
        let window = request.window();

        debug!(
            collection = %self.collection,
            clauses = predicate.clauses().len(),
            skip = window.skip,
            limit = window.limit,
            "executing search"
        );

        let documents = self
            .backend
            .query_documents(
                SearchPlan {
                    predicate: predicate.clone(),
                    projection,
                    sort,
                    window,
                },
                &self.collection,
            )
            .await
            .map_err(|err| SearchError::Fetch(err.to_string()))?;

        let mut warning = None;
        let total = match self
            .backend
            .count_documents(&predicate, &self.collection)
            .await
        {
            Ok(total) => total,
            Err(err) => {
                warn!(collection = %self.collection, %err, "count query failed");
                warning = Some(SearchError::Count(err.to_string()));
                0
            }
        };

        let mut transformed = Vec::with_capacity(documents.len());
        if let Some(mapper) = &self.mapper {
            for mut document in documents {
                // Mapping stops at the first failure; later documents stay
                // untransformed but are still returned.
                if warning.is_none() {
                    if let Err(err) = mapper.map(&mut document).await {
                        warn!(collection = %self.collection, %err, "result mapping failed");
                        warning = Some(SearchError::Mapping(err.to_string()));
                    }
                }
                transformed.push(document);
            }
        } else {
            transformed = documents;
        }

        let items = transformed
            .into_iter()
            .map(D::from_bson)
            .collect::<SearchResult<Vec<D>>>()?;

        Ok(SearchOutcome {
            items,
            total,
            warning,
        })
    }
}

/// Builder for [`Searcher`] instances.
pub struct SearcherBuilder<B: SearchBackend, M: Searchable, D: Document> {
    backend: B,
    collection: Option<String>,
    build_query: fn(&M) -> (Predicate, Projection),
    build_sort: fn(&str) -> SortSpec,
    extract: Extractor<M>,
    mapper: Option<Arc<dyn ResultMapper>>,
    _marker: PhantomData<fn() -> D>,
}

impl<B: SearchBackend, M: Searchable, D: Document> SearcherBuilder<B, M, D> {
    /// Creates a builder with the default compile, sort, and extraction functions.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            collection: None,
            build_query: compile::<M>,
            build_sort: |expression| parse_sort(expression, M::descriptors()),
            extract: extract_request::<M>,
            mapper: None,
            _marker: PhantomData,
        }
    }

    /// Overrides the target collection (defaults to `D::collection_name()`).
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Overrides the predicate compilation function.
    pub fn build_query(mut self, build_query: fn(&M) -> (Predicate, Projection)) -> Self {
        self.build_query = build_query;
        self
    }

    /// Overrides the sort-expression parser.
    pub fn build_sort(mut self, build_sort: fn(&str) -> SortSpec) -> Self {
        self.build_sort = build_sort;
        self
    }

    /// Overrides the directive extraction function.
    pub fn extract(mut self, extract: Extractor<M>) -> Self {
        self.extract = extract;
        self
    }

    /// Installs a post-fetch mapping transform.
    pub fn mapper(mut self, mapper: Arc<dyn ResultMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Builds the searcher.
    pub fn build(self) -> Searcher<B, M, D> {
        Searcher {
            backend: self.backend,
            collection: self
                .collection
                .unwrap_or_else(|| D::collection_name().to_string()),
            build_query: self.build_query,
            build_sort: self.build_sort,
            extract: self.extract,
            mapper: self.mapper,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BulkReport;
    use crate::field::{FieldDescriptor, FieldKind};
    use crate::model::FieldValue;
    use bson::{Uuid, doc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ticket {
        id: Uuid,
        subject: String,
    }

    impl Document for Ticket {
        fn id(&self) -> &Uuid {
            &self.id
        }

        fn collection_name() -> &'static str {
            "tickets"
        }
    }

    #[derive(Default)]
    struct TicketFilter {
        request: SearchRequest,
        subject: Option<String>,
    }

    static DESCRIPTORS: &[FieldDescriptor] = &[
        FieldDescriptor::new("request", FieldKind::Directive),
        FieldDescriptor::new("subject", FieldKind::Text),
    ];

    impl Searchable for TicketFilter {
        fn descriptors() -> &'static [FieldDescriptor] {
            DESCRIPTORS
        }

        fn values(&self) -> Vec<FieldValue<'_>> {
            vec![
                FieldValue::Directive(Some(&self.request)),
                FieldValue::Text(self.subject.as_deref()),
            ]
        }

        fn request(&self) -> Option<&SearchRequest> {
            Some(&self.request)
        }
    }

    /// Backend with canned responses for exercising the executor's
    /// failure asymmetry without a real store.
    #[derive(Debug, Default)]
    struct StubBackend {
        fail_fetch: bool,
        fail_count: bool,
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        async fn query_documents(
            &self,
            _plan: SearchPlan,
            _collection: &str,
        ) -> SearchResult<Vec<Bson>> {
            if self.fail_fetch {
                return Err(SearchError::Backend("fetch refused".to_string()));
            }
            Ok(vec![Bson::Document(doc! {
                "id": Uuid::new(),
                "subject": "printer on fire",
            })])
        }

        async fn count_documents(
            &self,
            _predicate: &Predicate,
            _collection: &str,
        ) -> SearchResult<u64> {
            if self.fail_count {
                return Err(SearchError::Backend("count refused".to_string()));
            }
            Ok(12)
        }

        async fn update_documents(
            &self,
            _documents: Vec<(Uuid, Bson)>,
            _collection: &str,
        ) -> BulkReport {
            BulkReport::Complete
        }
    }

    struct UppercaseSubject;

    #[async_trait]
    impl ResultMapper for UppercaseSubject {
        async fn map(&self, document: &mut Bson) -> SearchResult<()> {
            let body = document
                .as_document_mut()
                .ok_or_else(|| SearchError::Mapping("expected document".to_string()))?;
            let subject = body
                .get_str("subject")
                .map_err(|err| SearchError::Mapping(err.to_string()))?
                .to_uppercase();
            body.insert("subject", subject);
            Ok(())
        }
    }

    struct FailingMapper;

    #[async_trait]
    impl ResultMapper for FailingMapper {
        async fn map(&self, _document: &mut Bson) -> SearchResult<()> {
            Err(SearchError::Mapping("no can do".to_string()))
        }
    }

    fn filter() -> TicketFilter {
        TicketFilter {
            request: SearchRequest::new(1, 10),
            ..TicketFilter::default()
        }
    }

    #[tokio::test]
    async fn search_returns_items_and_total() {
        let searcher: Searcher<_, TicketFilter, Ticket> =
            Searcher::builder(StubBackend::default()).build();
        let outcome = searcher.search(&filter()).await.unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.total, 12);
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_aborts_the_call() {
        let searcher: Searcher<_, TicketFilter, Ticket> = Searcher::builder(StubBackend {
            fail_fetch: true,
            ..StubBackend::default()
        })
        .build();
        assert!(matches!(
            searcher.search(&filter()).await,
            Err(SearchError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn count_failure_degrades_to_zero_total() {
        let searcher: Searcher<_, TicketFilter, Ticket> = Searcher::builder(StubBackend {
            fail_count: true,
            ..StubBackend::default()
        })
        .build();
        let outcome = searcher.search(&filter()).await.unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.total, 0);
        assert!(matches!(outcome.warning, Some(SearchError::Count(_))));
    }

    #[tokio::test]
    async fn mapper_transforms_results() {
        let searcher: Searcher<_, TicketFilter, Ticket> =
            Searcher::builder(StubBackend::default())
                .mapper(Arc::new(UppercaseSubject))
                .build();
        let outcome = searcher.search(&filter()).await.unwrap();
        assert_eq!(outcome.items[0].subject, "PRINTER ON FIRE");
    }

    #[tokio::test]
    async fn mapping_failure_still_returns_the_page() {
        let searcher: Searcher<_, TicketFilter, Ticket> =
            Searcher::builder(StubBackend::default())
                .mapper(Arc::new(FailingMapper))
                .build();
        let outcome = searcher.search(&filter()).await.unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert!(matches!(outcome.warning, Some(SearchError::Mapping(_))));
    }

    #[tokio::test]
    async fn missing_directive_is_an_extraction_error() {
        struct Bare;

        impl Searchable for Bare {
            fn descriptors() -> &'static [FieldDescriptor] {
                &[]
            }

            fn values(&self) -> Vec<FieldValue<'_>> {
                Vec::new()
            }
        }

        let searcher: Searcher<_, Bare, Ticket> =
            Searcher::builder(StubBackend::default()).build();
        assert!(matches!(
            searcher.search(&Bare).await,
            Err(SearchError::Extraction(_))
        ));
    }
}
