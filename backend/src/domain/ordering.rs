//! Ordered loading with a local-sort fallback.
//!
//! Collections are first queried with server-side ordering on `createdAt`.
//! If that query fails for any reason (typically a missing index), the
//! collection is fetched unordered and sorted here. Callers only ever see a
//! correctly ordered result or the error of the fallback query.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use super::models::observation::{CREATED_AT_FIELD, DATE_FIELD};
use super::models::timestamp::parse_timestamp;
use crate::storage::{
    CollectionPath, DocumentStore, OrderBy, SortDirection, StoreError, StoredDocument,
};

pub async fn load_ordered(
    store: &dyn DocumentStore,
    collection: &CollectionPath,
    direction: SortDirection,
) -> Result<Vec<StoredDocument>, StoreError> {
    let order = OrderBy::new(CREATED_AT_FIELD, direction);
    match store.query_documents(collection, Some(&order)).await {
        Ok(documents) => Ok(documents),
        Err(err) => {
            warn!(collection = %collection, error = %err, "ordered query failed, sorting locally");
            let mut documents = store.query_documents(collection, None).await?;
            sort_by_timestamp(&mut documents, direction);
            Ok(documents)
        }
    }
}

/// Sort key of a document: `createdAt` when present, otherwise `date`.
/// Missing or unparseable values count as the epoch.
pub fn document_timestamp(document: &StoredDocument) -> DateTime<Utc> {
    let non_empty = |name: &str| {
        document
            .data
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    };
    non_empty(CREATED_AT_FIELD)
        .or_else(|| non_empty(DATE_FIELD))
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Stable sort by [`document_timestamp`]
pub fn sort_by_timestamp(documents: &mut [StoredDocument], direction: SortDirection) {
    documents.sort_by(|a, b| {
        let ordering = document_timestamp(a).cmp(&document_timestamp(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
