//! # REST API for Journal Entries

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use shared::{CreateJournalEntryRequest, JournalListResponse};
use tracing::{error, info};

use super::mappers::journal_mapper::JournalMapper;
use super::{error_response, CurrentSession};
use crate::AppState;

/// Create a router for journal related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", delete(delete_entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/journal");

    match state.journal_service.list_entries(session.identity()).await {
        Ok(entries) => {
            let response = JournalListResponse {
                entries: entries.into_iter().map(JournalMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list journal entries: {}", e);
            error_response(&e)
        }
    }
}

pub async fn create_entry(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<CreateJournalEntryRequest>,
) -> impl IntoResponse {
    info!("POST /api/journal - title: {:?}", request.title);

    let command = JournalMapper::to_command(request);
    match state.journal_service.create_entry(session.identity(), command).await {
        Ok(entry) => (StatusCode::CREATED, Json(JournalMapper::to_dto(entry))).into_response(),
        Err(e) => {
            error!("Failed to create journal entry: {}", e);
            error_response(&e)
        }
    }
}

pub async fn delete_entry(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/journal/{}", id);

    match state.journal_service.delete_entry(session.identity(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete journal entry {}: {}", id, e);
            error_response(&e)
        }
    }
}
