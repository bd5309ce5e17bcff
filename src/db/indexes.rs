use futures::TryStreamExt;
use mongodb::{
    bson::Document,
    error::{Error, ErrorKind},
    options::IndexOptions,
    Collection, IndexModel,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use super::Result;
use crate::errors::DriverError;
use crate::models::{IndexDescriptor, IndexOption};

/// Upper bound on how long listing a collection's indexes may block
pub const LIST_INDEXES_TIMEOUT: Duration = Duration::from_secs(2);

// listIndexes on a collection that has never been written to
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Fetches the current index metadata of `collection` from the server.
///
/// Entries are read as raw documents so that option fields with unexpected
/// types never hide an index's name.
pub async fn list_indexes<T: Send + Sync>(collection: &Collection<T>) -> Result<Vec<IndexDescriptor>> {
    let listing = async {
        let cursor = collection
            .list_indexes()
            .max_time(LIST_INDEXES_TIMEOUT)
            .await?;
        cursor.with_type::<Document>().try_collect::<Vec<Document>>().await
    };

    match timeout(LIST_INDEXES_TIMEOUT, listing).await {
        Ok(Ok(entries)) => Ok(entries.iter().map(IndexDescriptor::from_metadata).collect()),
        Ok(Err(e)) if is_namespace_not_found(&e) => Ok(Vec::new()),
        Ok(Err(e)) => Err(DriverError::IndexQuery {
            collection: collection.name().to_string(),
            source: e,
        }),
        Err(_) => Err(DriverError::IndexQueryTimeout {
            collection: collection.name().to_string(),
            timeout: LIST_INDEXES_TIMEOUT,
        }),
    }
}

pub async fn has_index<T: Send + Sync>(collection: &Collection<T>, name: &str) -> Result<bool> {
    let indexes = list_indexes(collection).await?;
    Ok(indexes.iter().any(|index| index.name == name))
}

/// Creates every index in `options` that does not exist yet.
///
/// Existence is decided by name only; an existing index with the same name
/// but different keys is left untouched. Stops at the first failure, keeping
/// the indexes created before it.
pub async fn create_index<T: Send + Sync>(collection: &Collection<T>, options: &[IndexOption]) -> Result<()> {
    for option in options {
        let name = option.index_name();

        if has_index(collection, &name).await? {
            debug!("Index '{}' already exists on '{}', skipping", name, collection.name());
            continue;
        }

        let model = IndexModel::builder()
            .keys(option.keys_document())
            .options(
                IndexOptions::builder()
                    .unique(option.unique)
                    .name(name.clone())
                    .build(),
            )
            .build();

        let created = collection
            .create_index(model)
            .await
            .map_err(|e| DriverError::IndexCreate {
                collection: collection.name().to_string(),
                name: name.clone(),
                source: e,
            })?;

        info!("Created index '{}' on collection '{}'", created.index_name, collection.name());
    }

    Ok(())
}

/// Drops indexes by exact name, stopping at the first failure.
pub async fn remove_index<T: Send + Sync, S: AsRef<str>>(collection: &Collection<T>, names: &[S]) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        collection
            .drop_index(name)
            .await
            .map_err(|e| DriverError::IndexDrop {
                collection: collection.name().to_string(),
                name: name.to_string(),
                source: e,
            })?;
        info!("Dropped index '{}' from collection '{}'", name, collection.name());
    }

    Ok(())
}

/// Drops the indexes `options` would create, deriving unset names the same
/// way [`create_index`] does.
pub async fn remove_index_by_option<T: Send + Sync>(collection: &Collection<T>, options: &[IndexOption]) -> Result<()> {
    let names: Vec<String> = options.iter().map(IndexOption::index_name).collect();
    remove_index(collection, &names).await
}

fn is_namespace_not_found(error: &Error) -> bool {
    matches!(*error.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_NOT_FOUND)
}
