//! Sort-expression parsing for search calls.
//!
//! A sort expression is a comma-separated list of logical field names, each
//! optionally prefixed with `+` (ascending, the default) or `-` (descending):
//! `"-createdAt, name"`. Field names are resolved to store columns through
//! the model's descriptor table; undeclared names pass through verbatim.

use crate::field::{FieldDescriptor, resolve_column};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// One sort key: a store column and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// The store column to sort by.
    pub column: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// An ordered sort specification.
///
/// Keys keep the token order of the source expression; a duplicate column
/// overwrites the direction of its earlier occurrence (last token wins,
/// since columns are unique keys). An empty specification leaves ordering to
/// the store, which is not guaranteed stable across pages — callers wanting
/// deterministic paging should include a uniquifying key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Creates an empty specification (store default order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no sort key is set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The sort keys in token order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Sets the direction for a column, overwriting an earlier occurrence.
    pub fn set(&mut self, column: impl Into<String>, direction: SortDirection) {
        let column = column.into();
        match self.keys.iter_mut().find(|key| key.column == column) {
            Some(key) => key.direction = direction,
            None => self.keys.push(SortKey { column, direction }),
        }
    }
}

/// Parses a sort expression against a model's descriptor table.
///
/// Empty input (and blank tokens) yield an empty specification.
pub fn parse_sort(expression: &str, descriptors: &[FieldDescriptor]) -> SortSpec {
    let mut spec = SortSpec::new();
    if expression.is_empty() {
        return spec;
    }

    for token in expression.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let (direction, name) = if let Some(rest) = token.strip_prefix('-') {
            (SortDirection::Desc, rest)
        } else if let Some(rest) = token.strip_prefix('+') {
            (SortDirection::Asc, rest)
        } else {
            (SortDirection::Asc, token)
        };
        if name.is_empty() {
            continue;
        }
        spec.set(resolve_column(descriptors, name), direction);
    }

    spec
}
