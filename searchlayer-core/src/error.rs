//! Error types and result types for search operations.
//!
//! This module provides error handling for every fallible search-layer
//! operation. Use [`SearchResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when executing a search or batch write.
///
/// The variants follow the failure taxonomy of the layer: serialization issues,
/// extraction failures (a search model carries no usable pagination/sort
/// directive), store failures (fetch, count, bulk write), and post-fetch
/// mapping failures.
///
/// Invalid match-mode annotations are deliberately *not* represented here:
/// they are a configuration error in the model declaration and are rejected
/// at compile time by the `Searchable` derive (or by a panic in the runtime
/// registration path), never at search time.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The search model exposes no pagination/sort directive to extract.
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// The page fetch query failed; no results are available.
    #[error("Fetch error: {0}")]
    Fetch(String),
    /// The total-count query failed; fetched results are intact but the count is unreliable.
    #[error("Count error: {0}")]
    Count(String),
    /// A post-fetch mapping transform failed on a result document.
    #[error("Mapping error: {0}")]
    Mapping(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for search-layer operations.
///
/// This type alias is used throughout the crate to indicate operations that may fail
/// with a [`SearchError`].
pub type SearchResult<T> = Result<T, SearchError>;

impl From<BsonError> for SearchError {
    fn from(err: BsonError) -> Self {
        SearchError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for SearchError {
    fn from(err: SerdeJsonError) -> Self {
        SearchError::Serialization(err.to_string())
    }
}
