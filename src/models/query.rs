use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

use super::sort::SortDirection;

/// Filter, sort and pagination for a list query.
///
/// `limit` and `skip` only take effect together: pagination is applied when
/// both are strictly positive and ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOption {
    pub filter: Document,
    pub sort: Vec<(String, SortDirection)>,
    pub limit: i64,
    pub skip: i64,
}

impl ListOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    /// Builds the filter from any value that serializes to a BSON document
    pub fn filter_from<F: Serialize>(filter: &F) -> Result<Self, bson::ser::Error> {
        Ok(Self::new().filter(bson::to_document(filter)?))
    }

    /// Appends a sort field. Fields apply in the order they are added.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = skip;
        self
    }

    pub fn is_paginated(&self) -> bool {
        self.limit > 0 && self.skip > 0
    }

    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }
        Some(
            self.sort
                .iter()
                .map(|(field, direction)| (field.clone(), Bson::from(*direction)))
                .collect(),
        )
    }
}
