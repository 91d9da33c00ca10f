//! Journal service domain logic.
//!
//! Free-text entries stored next to the tracking collections in
//! `users/{uid}/journal`, listed newest first with the same ordering
//! fallback as tracking records.

use std::sync::Arc;
use tracing::{error, info};

use super::clock::Clock;
use super::commands::journal::CreateJournalEntryCommand;
use super::errors::TrackingError;
use super::models::journal::{validate_entry, DomainJournalEntry, JOURNAL_COLLECTION};
use super::models::timestamp::format_timestamp;
use super::ordering::load_ordered;
use super::session::Identity;
use crate::storage::{CollectionPath, DocumentStore, SortDirection};

#[derive(Clone)]
pub struct JournalService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl JournalService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn collection(identity: &Identity) -> CollectionPath {
        CollectionPath::user_collection(identity.as_str(), JOURNAL_COLLECTION)
    }

    pub async fn create_entry(
        &self,
        identity: Option<&Identity>,
        command: CreateJournalEntryCommand,
    ) -> Result<DomainJournalEntry, TrackingError> {
        let identity = identity.ok_or(TrackingError::Unauthenticated)?;
        validate_entry(&command.title, &command.content)
            .map_err(|e| TrackingError::Validation(e.to_string()))?;

        let collection = Self::collection(identity);
        let mut entry = DomainJournalEntry {
            id: None,
            title: command.title.trim().to_string(),
            content: command.content.trim().to_string(),
            created_at: Some(format_timestamp(&self.clock.now())),
        };

        let id = self
            .store
            .add_document(&collection, entry.to_document())
            .await
            .map_err(|source| {
                error!(collection = %collection, error = %source, "failed to save journal entry");
                TrackingError::SaveFailed {
                    collection: collection.to_string(),
                    source,
                }
            })?;

        info!(collection = %collection, id = %id, "journal entry created");
        entry.id = Some(id);
        Ok(entry)
    }

    /// Entries newest first. No identity means no entries.
    pub async fn list_entries(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<DomainJournalEntry>, TrackingError> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };
        let collection = Self::collection(identity);
        let documents = load_ordered(self.store.as_ref(), &collection, SortDirection::Descending)
            .await
            .map_err(|source| TrackingError::QueryFailed {
                collection: collection.to_string(),
                source,
            })?;
        Ok(documents.into_iter().map(DomainJournalEntry::from_stored).collect())
    }

    pub async fn delete_entry(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), TrackingError> {
        let Some(identity) = identity else {
            return Ok(());
        };
        let collection = Self::collection(identity);
        self.store
            .delete_document(&collection, id)
            .await
            .map_err(|source| TrackingError::DeleteFailed {
                collection: collection.to_string(),
                id: id.to_string(),
                source,
            })?;
        info!(collection = %collection, id, "journal entry deleted");
        Ok(())
    }
}
