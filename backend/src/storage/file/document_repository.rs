//! # File Document Repository
//!
//! Stores each collection as a YAML list of documents in its own file.
//!
//! ```text
//! data/
//! └── users/
//!     └── {uid}/
//!         ├── trackingfeeding.yaml
//!         ├── trackingweight.yaml
//!         ├── trackingblood.yaml
//!         ├── trackingpulse.yaml
//!         └── journal.yaml
//! ```
//!
//! Files are rewritten atomically (temp file, then rename). There is no index,
//! so ordered queries are rejected and callers sort locally.

use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::connection::FileConnection;
use crate::storage::traits::{
    CollectionPath, Document, DocumentStore, OrderBy, StoreError, StoredDocument,
};

#[derive(Debug)]
pub struct FileDocumentStore {
    connection: FileConnection,
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    pub fn new(connection: FileConnection) -> Self {
        Self {
            connection,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_collection(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let file = self.connection.collection_file(collection);
        let content = match fs::read_to_string(&file).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    async fn write_collection(
        &self,
        collection: &CollectionPath,
        documents: &[StoredDocument],
    ) -> Result<(), StoreError> {
        let file = self.connection.ensure_collection_directory(collection).await?;
        let content = serde_yaml::to_string(documents)?;

        let temp_path = file.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &file).await?;

        debug!("Wrote {} documents to {:?}", documents.len(), file);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn add_document(
        &self,
        collection: &CollectionPath,
        document: Document,
    ) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.read_collection(collection).await?;
        let id = Uuid::new_v4().simple().to_string();
        documents.push(StoredDocument {
            id: id.clone(),
            data: document,
        });
        self.write_collection(collection, &documents).await?;
        Ok(id)
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        order: Option<&OrderBy>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if let Some(order) = order {
            return Err(StoreError::OrderingUnavailable {
                collection: collection.to_string(),
                field: order.field.clone(),
            });
        }
        let _guard = self.write_lock.lock().await;
        self.read_collection(collection).await
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.read_collection(collection).await?;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() != before {
            self.write_collection(collection, &documents).await?;
        }
        Ok(())
    }
}
