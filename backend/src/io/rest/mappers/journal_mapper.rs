use shared::{CreateJournalEntryRequest, JournalEntry};

use crate::domain::commands::journal::CreateJournalEntryCommand;
use crate::domain::models::journal::DomainJournalEntry;

pub struct JournalMapper;

impl JournalMapper {
    pub fn to_command(request: CreateJournalEntryRequest) -> CreateJournalEntryCommand {
        CreateJournalEntryCommand {
            title: request.title,
            content: request.content,
        }
    }

    pub fn to_dto(domain: DomainJournalEntry) -> JournalEntry {
        JournalEntry {
            id: domain.id.unwrap_or_default(),
            title: domain.title,
            content: domain.content,
            created_at: domain.created_at,
        }
    }
}
