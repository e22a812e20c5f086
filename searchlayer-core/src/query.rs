//! Predicate compilation for search models.
//!
//! This module turns a search-model value into a store-neutral filter
//! predicate plus a projection set. Compilation is pure: it walks the model's
//! fields in declaration order, classifies each by its declared
//! [`FieldKind`](crate::field::FieldKind), and emits at most one clause per
//! store column. Zero and empty values never produce a clause.
//!
//! Backends consume the predicate through [`PredicateVisitor`], translating
//! each clause into their native filter syntax.
//!
//! # Compilation rules
//!
//! - Text values become pattern clauses shaped by the field's match mode
//!   (`exact` compares by equality instead).
//! - The nested [`SearchRequest`] directive contributes exactly one of:
//!   a projection column list, per-column `not-in` exclusion clauses, or a
//!   free-text keyword. The keyword is deferred and applied per-field to the
//!   fields that declare a keyword mode and carry no explicit value; an
//!   explicit field value always wins over the keyword.
//! - Time ranges are half-open (`≥ start`, `< end`); date ranges apply only
//!   their present bounds; number ranges prefer the inclusive `min`/`max`
//!   bounds over the exclusive `lower`/`upper` ones.
//! - Lists become inclusion sets; non-zero scalars become equality clauses.

use bson::Bson;

use crate::{
    error::SearchError,
    field::{resolve, resolve_column},
    model::{FieldValue, SearchRequest, Searchable},
};

/// Bounds of a range clause. Each bound is optional and independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    /// Inclusive lower bound (`≥`).
    pub gte: Option<Bson>,
    /// Exclusive lower bound (`>`).
    pub gt: Option<Bson>,
    /// Inclusive upper bound (`≤`).
    pub lte: Option<Bson>,
    /// Exclusive upper bound (`<`).
    pub lt: Option<Bson>,
}

impl Bounds {
    /// Returns `true` if no bound is set.
    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.gt.is_none() && self.lte.is_none() && self.lt.is_none()
    }
}

/// A single column's match expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    /// Equality against the raw value.
    Eq(Bson),
    /// Regex-like pattern over a string column.
    Regex(String),
    /// Membership in a value set.
    In(Vec<Bson>),
    /// Exclusion from a value set.
    NotIn(Vec<Bson>),
    /// Range with inclusive/exclusive bounds.
    Between(Bounds),
}

/// One compiled filter clause: a store column and its match expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The store column this clause filters on.
    pub column: String,
    /// The match expression applied to the column.
    pub matches: Match,
}

/// A compiled filter predicate: an ordered mapping from store column to
/// match expression.
///
/// An empty predicate matches every document. Setting a column that already
/// holds a clause replaces the earlier clause (mapping keys are unique).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Creates an empty predicate (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the predicate has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Sets the match expression for a column, replacing any earlier clause
    /// on the same column in place.
    pub fn set(&mut self, column: impl Into<String>, matches: Match) {
        let column = column.into();
        match self
            .clauses
            .iter_mut()
            .find(|clause| clause.column == column)
        {
            Some(clause) => clause.matches = matches,
            None => self.clauses.push(Clause { column, matches }),
        }
    }

    /// Looks up the clause for a column.
    pub fn get(&self, column: &str) -> Option<&Match> {
        self.clauses
            .iter()
            .find(|clause| clause.column == column)
            .map(|clause| &clause.matches)
    }
}

/// The set of result columns to return; empty means all columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    /// Creates an empty projection (all columns).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if every column is returned.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The projected columns in insertion order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Adds a column to the projection, ignoring duplicates.
    pub fn insert(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }
}

/// Visitor over compiled clauses, implemented by each backend's translator.
///
/// [`PredicateVisitor::visit_clause`] dispatches a clause to the matching
/// `visit_*` method; backends only implement the leaf methods.
pub trait PredicateVisitor {
    type Output;
    type Error: Into<SearchError>;

    fn visit_eq(&mut self, column: &str, value: &Bson) -> Result<Self::Output, Self::Error>;
    fn visit_regex(&mut self, column: &str, pattern: &str) -> Result<Self::Output, Self::Error>;
    fn visit_in(&mut self, column: &str, values: &[Bson]) -> Result<Self::Output, Self::Error>;
    fn visit_not_in(&mut self, column: &str, values: &[Bson])
    -> Result<Self::Output, Self::Error>;
    fn visit_between(&mut self, column: &str, bounds: &Bounds)
    -> Result<Self::Output, Self::Error>;

    fn visit_clause(&mut self, clause: &Clause) -> Result<Self::Output, Self::Error> {
        match &clause.matches {
            Match::Eq(value) => self.visit_eq(&clause.column, value),
            Match::Regex(pattern) => self.visit_regex(&clause.column, pattern),
            Match::In(values) => self.visit_in(&clause.column, values),
            Match::NotIn(values) => self.visit_not_in(&clause.column, values),
            Match::Between(bounds) => self.visit_between(&clause.column, bounds),
        }
    }
}

/// Compiles a search model into a filter predicate and a projection set.
///
/// Compilation never fails and never touches the model: all configuration
/// errors (unsupported match modes) are rejected when the model type is
/// declared, and every malformed runtime value simply contributes no clause.
pub fn compile<M: Searchable>(model: &M) -> (Predicate, Projection) {
    let descriptors = M::descriptors();
    let values = model.values();
    debug_assert_eq!(
        descriptors.len(),
        values.len(),
        "descriptor table and value list must align"
    );

    let mut predicate = Predicate::new();
    let mut projection = Projection::new();

    // The directive may appear anywhere in declaration order, but its
    // keyword must reach fields declared before it, so it is applied first.
    let mut keyword = String::new();
    for value in &values {
        if let FieldValue::Directive(Some(request)) = value {
            keyword = apply_directive(request, descriptors, &mut predicate, &mut projection);
        }
    }

    for (descriptor, value) in descriptors.iter().zip(values.iter()) {
        match value {
            FieldValue::Text(text) => {
                let explicit = text.filter(|text| !text.is_empty());
                if let Some(text) = explicit {
                    match descriptor.matches.pattern(text) {
                        Some(pattern) => predicate.set(descriptor.column, Match::Regex(pattern)),
                        None => predicate
                            .set(descriptor.column, Match::Eq(Bson::String(text.to_string()))),
                    }
                } else if !keyword.is_empty() {
                    if let Some(mode) = descriptor.keyword {
                        match mode.pattern(&keyword) {
                            Some(pattern) => {
                                predicate.set(descriptor.column, Match::Regex(pattern))
                            }
                            None => predicate
                                .set(descriptor.column, Match::Eq(Bson::String(keyword.clone()))),
                        }
                    }
                }
            }
            FieldValue::Directive(_) => {}
            FieldValue::Time(Some(range)) => {
                predicate.set(
                    descriptor.column,
                    Match::Between(Bounds {
                        gte: Some(Bson::DateTime(range.start)),
                        lt: Some(Bson::DateTime(range.end)),
                        ..Bounds::default()
                    }),
                );
            }
            FieldValue::Date(Some(range)) => {
                let bounds = Bounds {
                    gte: range.start.map(Bson::DateTime),
                    lte: range.end.map(Bson::DateTime),
                    ..Bounds::default()
                };
                if !bounds.is_empty() {
                    predicate.set(descriptor.column, Match::Between(bounds));
                }
            }
            FieldValue::Number(Some(range)) => {
                let mut bounds = Bounds::default();
                if let Some(min) = range.min {
                    bounds.gte = Some(Bson::Double(min));
                } else if let Some(lower) = range.lower {
                    bounds.gt = Some(Bson::Double(lower));
                }
                if let Some(max) = range.max {
                    bounds.lte = Some(Bson::Double(max));
                } else if let Some(upper) = range.upper {
                    bounds.lt = Some(Bson::Double(upper));
                }
                if !bounds.is_empty() {
                    predicate.set(descriptor.column, Match::Between(bounds));
                }
            }
            FieldValue::List(values) => {
                if !values.is_empty() {
                    predicate.set(descriptor.column, Match::In(values.clone()));
                }
            }
            FieldValue::Scalar(Some(value)) => {
                if !is_zero(value) {
                    predicate.set(descriptor.column, Match::Eq(value.clone()));
                }
            }
            FieldValue::Time(None)
            | FieldValue::Date(None)
            | FieldValue::Number(None)
            | FieldValue::Scalar(None) => {}
        }
    }

    (predicate, projection)
}

/// Applies a directive's exclusive branch and returns its trimmed keyword.
///
/// A directive contributes exactly one of its three facets: a non-empty
/// `fields` list projects and suppresses the rest; otherwise a non-empty
/// `excluding` map emits `not-in` clauses; otherwise the keyword (if any)
/// is handed back for the deferred per-field scan.
fn apply_directive(
    request: &SearchRequest,
    descriptors: &[crate::field::FieldDescriptor],
    predicate: &mut Predicate,
    projection: &mut Projection,
) -> String {
    if !request.fields.is_empty() {
        for name in &request.fields {
            // Undeclared projection keys cannot be mapped to a column; they
            // degrade to "not projected" rather than failing the call.
            if let Some(descriptor) = resolve(descriptors, name) {
                projection.insert(descriptor.column);
            }
        }
    } else if !request.excluding.is_empty() {
        for (name, excluded) in &request.excluding {
            if !excluded.is_empty() {
                let column = resolve_column(descriptors, name);
                predicate.set(column, Match::NotIn(excluded.clone()));
            }
        }
    } else if !request.keyword.trim().is_empty() {
        return request.keyword.trim().to_string();
    }

    String::new()
}

/// Zero/empty scalar values never produce constraints.
fn is_zero(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => !flag,
        Bson::Int32(number) => *number == 0,
        Bson::Int64(number) => *number == 0,
        Bson::Double(number) => *number == 0.0,
        Bson::String(text) => text.is_empty(),
        Bson::Null => true,
        _ => false,
    }
}
