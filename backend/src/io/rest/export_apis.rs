//! # REST API for Data Export
//!
//! Endpoints for the per-metric data summary and the CSV and text export
//! payloads. Exports are returned to the client; nothing is written to disk.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use super::{error_response, CurrentSession};
use crate::AppState;

/// Create a router for export related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(data_summary))
        .route("/csv", get(export_csv))
        .route("/text", get(export_text))
}

pub async fn data_summary(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/export/summary");

    match state.export_service.data_summary(session.identity()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to load data summary: {}", e);
            error_response(&e)
        }
    }
}

/// Export every record as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/export/csv");

    match state.export_service.export_csv(session.identity()).await {
        Ok(payload) => {
            info!("CSV export ready with {} records", payload.record_count);
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            error!("Failed to export CSV: {}", e);
            error_response(&e)
        }
    }
}

/// Export every record as a plain-text report
pub async fn export_text(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/export/text");

    match state.export_service.export_text(session.identity()).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => {
            error!("Failed to export text: {}", e);
            error_response(&e)
        }
    }
}
