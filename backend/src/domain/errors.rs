//! Error taxonomy for tracking, journal and export operations.
//!
//! Store failures are caught at the service boundary and wrapped with the
//! collection they happened on. A failed ordered query is not listed here:
//! it is recovered by the ordering fallback and never reaches callers.

use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum TrackingError {
    /// An operation that writes or exports data was attempted without an identity
    #[error("Authentication required: please log in")]
    Unauthenticated,

    /// Both the ordered query and the unordered fallback failed
    #[error("Failed to load records from {collection}: {source}")]
    QueryFailed {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to save record to {collection}: {source}")]
    SaveFailed {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete record {id} from {collection}: {source}")]
    DeleteFailed {
        collection: String,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Failed to build export: {0}")]
    ExportFailed(String),
}
