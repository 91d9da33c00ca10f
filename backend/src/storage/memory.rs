//! In-memory document store.
//!
//! Used for development runs and tests. Ordered queries can be switched off
//! to behave like a hosted store whose ordering index has not been created.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::traits::{
    order_documents, CollectionPath, Document, DocumentStore, OrderBy, StoreError, StoredDocument,
};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, Vec<StoredDocument>>>,
    ordering_disabled: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every ordered query with `OrderingUnavailable`
    pub fn without_ordering() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            ordering_disabled: true,
        }
    }

    /// Insert a document with a caller-chosen id, bypassing id assignment.
    /// Handy for seeding legacy documents.
    pub async fn insert_raw(&self, collection: &CollectionPath, id: &str, data: Document) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.clone())
            .or_default()
            .push(StoredDocument {
                id: id.to_string(),
                data,
            });
    }

    pub async fn document_count(&self, collection: &CollectionPath) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add_document(
        &self,
        collection: &CollectionPath,
        document: Document,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                data: document,
            });
        debug!(collection = %collection, id = %id, "document added");
        Ok(id)
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        order: Option<&OrderBy>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if let (Some(order), true) = (order, self.ordering_disabled) {
            return Err(StoreError::OrderingUnavailable {
                collection: collection.to_string(),
                field: order.field.clone(),
            });
        }

        let collections = self.collections.read().await;
        let mut documents = collections.get(collection).cloned().unwrap_or_default();
        if let Some(order) = order {
            order_documents(&mut documents, order);
        }
        Ok(documents)
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(collection) {
            documents.retain(|d| d.id != id);
        }
        Ok(())
    }
}
