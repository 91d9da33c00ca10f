use serde_json::Value;

use super::observation::CREATED_AT_FIELD;
use crate::storage::{Document, StoredDocument};

pub const JOURNAL_COLLECTION: &str = "journal";

/// Free-text journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct DomainJournalEntry {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: Option<String>,
}

impl DomainJournalEntry {
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("title".to_string(), Value::String(self.title.clone()));
        document.insert("content".to_string(), Value::String(self.content.clone()));
        if let Some(created_at) = &self.created_at {
            document.insert(CREATED_AT_FIELD.to_string(), Value::String(created_at.clone()));
        }
        document
    }

    pub fn from_stored(stored: StoredDocument) -> Self {
        let text = |name: &str| {
            stored
                .data
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            title: text("title").unwrap_or_default(),
            content: text("content").unwrap_or_default(),
            created_at: text(CREATED_AT_FIELD).filter(|s| !s.trim().is_empty()),
            id: Some(stored.id.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JournalValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Content cannot be empty")]
    EmptyContent,
}

/// Both title and content are required
pub fn validate_entry(title: &str, content: &str) -> Result<(), JournalValidationError> {
    if title.trim().is_empty() {
        return Err(JournalValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(JournalValidationError::EmptyContent);
    }
    Ok(())
}
