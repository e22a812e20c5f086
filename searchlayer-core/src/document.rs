//! Core traits for document representation and serialization.
//!
//! Search results and batch-write records are typed values that round-trip
//! through BSON. The [`Document`] trait defines the minimal contract: a
//! unique identifier and a collection name. [`DocumentExt`] adds the
//! conversion helpers used by the executor and the batch writer.

use bson::{Bson, Uuid, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;

/// Core trait for any record type that can be fetched or written by the layer.
///
/// # Example
///
/// ```ignore
/// use searchlayer_core::document::Document;
/// use bson::Uuid;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub id: Uuid,
///     pub name: String,
/// }
///
/// impl Document for User {
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "users"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &Uuid;

    /// Returns the name of the collection this document belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "users", "products").
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization/deserialization utilities for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> SearchResult<Bson>;

    /// Creates a document from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> SearchResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> SearchResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> SearchResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}
