use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Result;
use crate::errors::DriverError;
use crate::models::ListOption;

/// Translates a [`ListOption`] into driver find options.
///
/// Sort is set whenever at least one sort field is given. Skip and limit are
/// only set when both are strictly positive; a lone limit or skip is dropped.
pub fn find_options(option: &ListOption) -> FindOptions {
    let mut find_options = FindOptions::default();
    if option.is_paginated() {
        find_options.limit = Some(option.limit);
        find_options.skip = Some(option.skip as u64);
    }
    find_options.sort = option.sort_document();
    find_options
}

/// Runs `option` against `collection` and replaces the contents of `results`
/// with every matching document.
///
/// The whole result set is held in memory; without pagination that may be
/// the entire collection.
pub async fn list<C, T>(collection: &Collection<C>, option: &ListOption, results: &mut Vec<T>) -> Result<()>
where
    C: Send + Sync,
    T: DeserializeOwned + Send + Sync + Unpin,
{
    debug!(
        "Find on '{}' filter={} sort={:?} limit={} skip={}",
        collection.name(),
        option.filter,
        option.sort,
        option.limit,
        option.skip
    );

    let cursor = collection
        .clone_with_type::<T>()
        .find(option.filter.clone())
        .with_options(find_options(option))
        .await
        .map_err(|e| DriverError::Query {
            collection: collection.name().to_string(),
            source: e,
        })?;

    let documents: Vec<T> = cursor
        .try_collect()
        .await
        .map_err(|e| DriverError::QueryDecode {
            collection: collection.name().to_string(),
            source: e,
        })?;

    results.clear();
    results.extend(documents);
    Ok(())
}

/// Same as [`list`], returning a fresh vector.
pub async fn find_all<C, T>(collection: &Collection<C>, option: &ListOption) -> Result<Vec<T>>
where
    C: Send + Sync,
    T: DeserializeOwned + Send + Sync + Unpin,
{
    let mut results = Vec::new();
    list(collection, option, &mut results).await?;
    Ok(results)
}
