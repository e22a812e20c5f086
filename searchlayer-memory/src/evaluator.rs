//! Predicate evaluation for in-memory document filtering.
//!
//! This module evaluates compiled filter clauses directly against BSON
//! documents, mirroring the comparison semantics of a real document store:
//! missing fields fail every positive match but satisfy exclusion sets, and
//! patterns are matched case-sensitively against string fields.

use std::cmp::Ordering;

use bson::{Bson, datetime::DateTime};
use regex::Regex;

use searchlayer_core::{
    error::{SearchError, SearchResult},
    query::{Bounds, Predicate, PredicateVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Normalizes all numeric types to f64 so mixed-width comparisons behave
/// like the store's. Non-comparable types collapse to `Null`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or non-comparable value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a compiled predicate against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    /// Returns `true` when every clause of the predicate holds.
    pub fn matches(&mut self, predicate: &Predicate) -> SearchResult<bool> {
        for clause in predicate.clauses() {
            if !self.visit_clause(clause)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn field(&self, column: &str) -> Option<&'a Bson> {
        self.document
            .as_document()
            .and_then(|document| document.get(column))
    }
}

impl<'a> PredicateVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = SearchError;

    fn visit_eq(&mut self, column: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(self
            .field(column)
            .is_some_and(|field| Comparable::from(field) == Comparable::from(value)))
    }

    fn visit_regex(&mut self, column: &str, pattern: &str) -> Result<Self::Output, Self::Error> {
        let regex = Regex::new(pattern)
            .map_err(|err| SearchError::Backend(format!("invalid pattern: {err}")))?;

        Ok(self
            .field(column)
            .and_then(Bson::as_str)
            .is_some_and(|field| regex.is_match(field)))
    }

    fn visit_in(&mut self, column: &str, values: &[Bson]) -> Result<Self::Output, Self::Error> {
        let Some(field) = self.field(column) else {
            return Ok(false);
        };

        Ok(match Comparable::from(field) {
            // An array field matches when any of its elements is in the set.
            Comparable::Array(elements) => values
                .iter()
                .any(|value| elements.iter().any(|element| *element == Comparable::from(value))),
            field => values.iter().any(|value| Comparable::from(value) == field),
        })
    }

    fn visit_not_in(&mut self, column: &str, values: &[Bson]) -> Result<Self::Output, Self::Error> {
        // Exclusion sets also match documents that lack the field entirely.
        let Some(field) = self.field(column) else {
            return Ok(true);
        };

        Ok(match Comparable::from(field) {
            Comparable::Array(elements) => !values
                .iter()
                .any(|value| elements.iter().any(|element| *element == Comparable::from(value))),
            field => !values.iter().any(|value| Comparable::from(value) == field),
        })
    }

    fn visit_between(&mut self, column: &str, bounds: &Bounds) -> Result<Self::Output, Self::Error> {
        let Some(field) = self.field(column) else {
            return Ok(false);
        };
        let field = Comparable::from(field);

        let holds = |bound: &Option<Bson>, accepted: &[Ordering]| -> bool {
            match bound {
                Some(bound) => field
                    .partial_cmp(&Comparable::from(bound))
                    .is_some_and(|ordering| accepted.contains(&ordering)),
                None => true,
            }
        };

        Ok(holds(&bounds.gte, &[Ordering::Greater, Ordering::Equal])
            && holds(&bounds.gt, &[Ordering::Greater])
            && holds(&bounds.lte, &[Ordering::Less, Ordering::Equal])
            && holds(&bounds.lt, &[Ordering::Less]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use searchlayer_core::query::Match;

    fn predicate(column: &str, matches: Match) -> Predicate {
        let mut predicate = Predicate::new();
        predicate.set(column, matches);
        predicate
    }

    #[test]
    fn equality_respects_numeric_widths() {
        let document = Bson::Document(doc! { "retries": 3_i32 });
        let mut evaluator = DocumentEvaluator::new(&document);
        assert!(evaluator
            .matches(&predicate("retries", Match::Eq(Bson::Int64(3))))
            .unwrap());
    }

    #[test]
    fn missing_field_fails_positive_matches() {
        let document = Bson::Document(doc! {});
        let mut evaluator = DocumentEvaluator::new(&document);
        assert!(!evaluator
            .matches(&predicate("name", Match::Eq(Bson::String("a".to_string()))))
            .unwrap());
    }

    #[test]
    fn missing_field_satisfies_exclusion() {
        let document = Bson::Document(doc! {});
        let mut evaluator = DocumentEvaluator::new(&document);
        assert!(evaluator
            .matches(&predicate(
                "status",
                Match::NotIn(vec![Bson::String("done".to_string())]),
            ))
            .unwrap());
    }

    #[test]
    fn contain_pattern_matches_inner_text() {
        let document = Bson::Document(doc! { "subject": "printer exploded" });
        let mut evaluator = DocumentEvaluator::new(&document);
        assert!(evaluator
            .matches(&predicate(
                "subject",
                Match::Regex("\\w*explode\\w*".to_string()),
            ))
            .unwrap());
        assert!(!evaluator
            .matches(&predicate("subject", Match::Regex("^exploded".to_string())))
            .unwrap());
    }

    #[test]
    fn half_open_bounds_hold_at_the_edges() {
        let start = DateTime::from_millis(1_000);
        let end = DateTime::from_millis(2_000);
        let bounds = Bounds {
            gte: Some(Bson::DateTime(start)),
            lt: Some(Bson::DateTime(end)),
            ..Bounds::default()
        };

        let at_start = Bson::Document(doc! { "at": start });
        assert!(DocumentEvaluator::new(&at_start)
            .matches(&predicate("at", Match::Between(bounds.clone())))
            .unwrap());

        let at_end = Bson::Document(doc! { "at": end });
        assert!(!DocumentEvaluator::new(&at_end)
            .matches(&predicate("at", Match::Between(bounds)))
            .unwrap());
    }
}
