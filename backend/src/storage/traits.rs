//! # Storage Traits
//!
//! This module defines the document store abstraction the domain layer talks
//! to. A store holds flat key/value documents grouped into collections that
//! are addressed by a slash-separated key path (`users/{uid}/trackingweight`).
//! Implementations can be swapped (in-memory, local files, a hosted document
//! database) without touching the domain services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A flat key/value document as persisted by the store
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A document together with the id the store assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// Key path of a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Path of a collection owned by a single user: `users/{uid}/{collection}`
    pub fn user_collection(user_id: &str, collection: &str) -> Self {
        Self {
            segments: vec![
                "users".to_string(),
                user_id.to_string(),
                collection.to_string(),
            ],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last path segment, i.e. the collection name
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Server-side ordering requested for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Errors raised by document store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot order this collection by the requested field
    /// (for hosted stores: the backing index does not exist).
    #[error("ordering by '{field}' is not available for collection {collection}")]
    OrderingUnavailable { collection: String, field: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored collection is malformed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Trait defining the interface for document collection storage.
///
/// All operations are scoped to one collection. Deleting an id that does not
/// exist is not an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document and return the id assigned to it
    async fn add_document(
        &self,
        collection: &CollectionPath,
        document: Document,
    ) -> Result<String, StoreError>;

    /// Return every document in the collection, optionally ordered server-side
    async fn query_documents(
        &self,
        collection: &CollectionPath,
        order: Option<&OrderBy>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Remove a single document by id
    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<(), StoreError>;
}

/// Order documents by a field value the way a document database would:
/// strings compare lexically, numbers numerically, documents without the
/// field sort after all documents that have it.
pub fn order_documents(documents: &mut [StoredDocument], order: &OrderBy) {
    use serde_json::Value;
    use std::cmp::Ordering;

    documents.sort_by(|a, b| {
        let left = a.data.get(&order.field);
        let right = b.data.get(&order.field);
        match (left, right) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l, r) {
                    (Value::Number(x), Value::Number(y)) => x
                        .as_f64()
                        .partial_cmp(&y.as_f64())
                        .unwrap_or(Ordering::Equal),
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    _ => l.to_string().cmp(&r.to_string()),
                };
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
        }
    });
}
