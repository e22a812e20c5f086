//! The search-model contract and the value shapes it can carry.
//!
//! A search model is an application-defined struct in which every field is
//! one optional criterion. The model type implements [`Searchable`] —
//! normally via the `#[derive(Searchable)]` macro — which exposes the static
//! descriptor table, the per-call field values, and the embedded
//! [`SearchRequest`] directive that carries pagination and sorting.

use std::collections::BTreeMap;

use bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};

use crate::field::FieldDescriptor;

/// The nested search directive carried by a search model.
///
/// One field of the model (conventionally the first) holds this struct; it
/// supplies pagination and sorting for the call and, optionally, a
/// projection column list, per-column exclusion sets, and a free-text
/// keyword scanned against fields that opt in via a keyword match mode.
///
/// All fields default, so the struct deserializes directly from sparse
/// request payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The page number (1-indexed).
    #[serde(default)]
    pub page: u64,
    /// Number of records per page.
    #[serde(default)]
    pub limit: u64,
    /// Size override for the first page; `0` disables the override.
    #[serde(default)]
    pub first_limit: u64,
    /// Comma-separated sort expression (`-createdAt, name`).
    #[serde(default)]
    pub sort: String,
    /// Logical field names to project; empty means all columns.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Per-field value exclusion sets, keyed by logical field name.
    #[serde(default)]
    pub excluding: BTreeMap<String, Vec<Bson>>,
    /// Free-text keyword matched against fields declaring a keyword mode.
    #[serde(default)]
    pub keyword: String,
}

impl SearchRequest {
    /// Creates a directive for the given page and page size.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Sets the first-page size override.
    pub fn with_first_limit(mut self, first_limit: u64) -> Self {
        self.first_limit = first_limit;
        self
    }

    /// Sets the sort expression.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Sets the free-text keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }
}

/// A half-open timestamp range: `start ≤ x < end`.
///
/// Both bounds are required; an absent range is expressed by leaving the
/// model field `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: DateTime,
    /// Exclusive upper bound.
    pub end: DateTime,
}

/// A date range in which either bound may be absent.
///
/// Both bounds are inclusive. A range with neither bound set constrains
/// nothing and is skipped by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Inclusive lower bound.
    #[serde(default)]
    pub start: Option<DateTime>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub end: Option<DateTime>,
}

/// A numeric range with inclusive and exclusive bound variants.
///
/// `min`/`max` are inclusive and take priority over the exclusive
/// `lower`/`upper` when both are set. A range producing no clause at all is
/// skipped by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    /// Inclusive lower bound; wins over `lower`.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound; wins over `upper`.
    #[serde(default)]
    pub max: Option<f64>,
    /// Exclusive lower bound.
    #[serde(default)]
    pub lower: Option<f64>,
    /// Exclusive upper bound.
    #[serde(default)]
    pub upper: Option<f64>,
}

/// A search-model field's value for one call, tagged by its declared kind.
///
/// The variants parallel [`crate::field::FieldKind`]; [`Searchable::values`]
/// must yield them in the same order as the descriptor table so the compiler
/// can zip the two.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    /// Text criterion; `None` or empty means no constraint.
    Text(Option<&'a str>),
    /// The nested search directive, if present on this field.
    Directive(Option<&'a SearchRequest>),
    /// Timestamp range criterion.
    Time(Option<&'a TimeRange>),
    /// Date range criterion.
    Date(Option<&'a DateRange>),
    /// Numeric range criterion.
    Number(Option<&'a NumberRange>),
    /// Inclusion-set criterion; empty means no constraint.
    List(Vec<Bson>),
    /// Scalar equality criterion; `None` and zero/false values mean no constraint.
    Scalar(Option<Bson>),
}

/// Contract implemented by every search-model type.
///
/// Use `#[derive(Searchable)]` from `searchlayer-macros` to generate the
/// implementation; hand-written implementations are equally valid and follow
/// the same alignment rule between [`Self::descriptors`] and
/// [`Self::values`].
pub trait Searchable: Send + Sync {
    /// The static descriptor table for this model type, in declaration order.
    fn descriptors() -> &'static [FieldDescriptor]
    where
        Self: Sized;

    /// This call's field values, aligned index-for-index with the descriptor table.
    fn values(&self) -> Vec<FieldValue<'_>>;

    /// The embedded pagination/sort directive, if the model carries one.
    ///
    /// The default search extractor fails the call when this returns `None`.
    fn request(&self) -> Option<&SearchRequest> {
        None
    }
}
