//! Predicate translation to MongoDB query syntax.
//!
//! Translates compiled searchlayer clauses into MongoDB's native BSON filter
//! documents, and assembles projection/sort option documents from the
//! compiled plan.

use bson::{Bson, Document, Regex, doc};

use searchlayer_core::{
    error::SearchError,
    query::{Bounds, Predicate, PredicateVisitor, Projection},
    sort::{SortDirection, SortSpec},
};

/// Translates compiled clauses into MongoDB filter documents.
pub(crate) struct MongoPredicateTranslator;

impl PredicateVisitor for MongoPredicateTranslator {
    type Output = Document;
    type Error = SearchError;

    fn visit_eq(&mut self, column: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! { column: { "$eq": value.clone() } })
    }

    fn visit_regex(&mut self, column: &str, pattern: &str) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            column: Bson::RegularExpression(Regex {
                pattern: pattern.to_string().try_into()?,
                options: String::new().try_into()?,
            }),
        })
    }

    fn visit_in(&mut self, column: &str, values: &[Bson]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { column: { "$in": values.to_vec() } })
    }

    fn visit_not_in(&mut self, column: &str, values: &[Bson]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { column: { "$nin": values.to_vec() } })
    }

    fn visit_between(&mut self, column: &str, bounds: &Bounds) -> Result<Self::Output, Self::Error> {
        let mut range = Document::new();
        if let Some(gte) = &bounds.gte {
            range.insert("$gte", gte.clone());
        }
        if let Some(gt) = &bounds.gt {
            range.insert("$gt", gt.clone());
        }
        if let Some(lte) = &bounds.lte {
            range.insert("$lte", lte.clone());
        }
        if let Some(lt) = &bounds.lt {
            range.insert("$lt", lt.clone());
        }

        Ok(doc! { column: range })
    }
}

/// Builds the full filter document for a predicate.
pub(crate) fn filter_document(predicate: &Predicate) -> Result<Document, SearchError> {
    let mut filter = Document::new();
    for clause in predicate.clauses() {
        filter.extend(MongoPredicateTranslator.visit_clause(clause)?);
    }

    Ok(filter)
}

/// Builds the projection option document; `None` when all columns are returned.
pub(crate) fn projection_document(projection: &Projection) -> Option<Document> {
    if projection.is_empty() {
        return None;
    }

    Some(
        projection
            .columns()
            .iter()
            .map(|column| (column.clone(), Bson::Int32(1)))
            .collect(),
    )
}

/// Builds the sort option document; `None` when the store default order applies.
pub(crate) fn sort_document(sort: &SortSpec) -> Option<Document> {
    if sort.is_empty() {
        return None;
    }

    Some(
        sort.keys()
            .iter()
            .map(|key| {
                (
                    key.column.clone(),
                    Bson::Int32(match key.direction {
                        SortDirection::Asc => 1,
                        SortDirection::Desc => -1,
                    }),
                )
            })
            .collect(),
    )
}
