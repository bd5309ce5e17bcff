use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the connector, index manager and query executor.
///
/// Every variant carries the driver error that caused it. Nothing is retried
/// or recovered below this type; callers own retry policy.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to connect to MongoDB at {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Failed to list indexes of collection '{collection}': {source}")]
    IndexQuery {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Listing indexes of collection '{collection}' timed out after {timeout:?}")]
    IndexQueryTimeout {
        collection: String,
        timeout: Duration,
    },

    #[error("Failed to create index '{name}' on collection '{collection}': {source}")]
    IndexCreate {
        collection: String,
        name: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Failed to drop index '{name}' from collection '{collection}': {source}")]
    IndexDrop {
        collection: String,
        name: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Find on collection '{collection}' failed: {source}")]
    Query {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Failed to read results of find on collection '{collection}': {source}")]
    QueryDecode {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },
}

impl DriverError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DriverError::Connection { .. } => "CONNECTION_ERROR",
            DriverError::IndexQuery { .. } | DriverError::IndexQueryTimeout { .. } => "INDEX_QUERY_ERROR",
            DriverError::IndexCreate { .. } => "INDEX_CREATE_ERROR",
            DriverError::IndexDrop { .. } => "INDEX_DROP_ERROR",
            DriverError::Query { .. } => "QUERY_ERROR",
            DriverError::QueryDecode { .. } => "QUERY_DECODE_ERROR",
        }
    }

    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            DriverError::IndexQuery { .. }
                | DriverError::IndexQueryTimeout { .. }
                | DriverError::IndexCreate { .. }
                | DriverError::IndexDrop { .. }
        )
    }

    /// Name of the collection the failed operation targeted, if any
    pub fn collection(&self) -> Option<&str> {
        match self {
            DriverError::Connection { .. } => None,
            DriverError::IndexQuery { collection, .. }
            | DriverError::IndexQueryTimeout { collection, .. }
            | DriverError::IndexCreate { collection, .. }
            | DriverError::IndexDrop { collection, .. }
            | DriverError::Query { collection, .. }
            | DriverError::QueryDecode { collection, .. } => Some(collection),
        }
    }
}
