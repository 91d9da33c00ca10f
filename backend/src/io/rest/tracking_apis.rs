//! # REST API for Tracking Records
//!
//! List, create and delete observations for one metric, plus its chart series.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use shared::{DeleteRecordResponse, Metric, SaveRecordRequest};
use tracing::{error, info};

use super::mappers::observation_mapper::ObservationMapper;
use super::{error_response, CurrentSession};
use crate::domain::commands::tracking::RecordForm;
use crate::domain::models::timestamp::parse_timestamp;
use crate::domain::TrackingError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub limit: Option<usize>,
}

/// Create a router for tracking related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:metric", get(list_records).post(save_record))
        .route("/:metric/chart", get(chart_series))
        .route("/:metric/:id", delete(delete_record))
}

/// List records newest first
pub async fn list_records(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(metric): Path<Metric>,
) -> impl IntoResponse {
    info!("GET /api/tracking/{}", metric);

    match state.tracking_service.load_records(session.identity(), metric).await {
        Ok(records) => {
            let response = ObservationMapper::to_list_response(metric, records);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list {} records: {}", metric, e);
            error_response(&e)
        }
    }
}

/// Save a new record from raw form values
pub async fn save_record(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(metric): Path<Metric>,
    Json(request): Json<SaveRecordRequest>,
) -> impl IntoResponse {
    info!("POST /api/tracking/{} - request: {:?}", metric, request);

    let date = match request.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => match parse_timestamp(raw) {
            Some(date) => date,
            None => {
                return error_response(&TrackingError::Validation(format!("Invalid date: {raw}")));
            }
        },
        None => state.tracking_service.clock().now(),
    };
    let form = RecordForm {
        date,
        values: request.values,
    };

    match state.tracking_service.save_record(session.identity(), metric, &form).await {
        Ok(saved) => (StatusCode::CREATED, Json(ObservationMapper::to_dto(saved))).into_response(),
        Err(e) => {
            error!("Failed to save {} record: {}", metric, e);
            error_response(&e)
        }
    }
}

pub async fn delete_record(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((metric, id)): Path<(Metric, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/tracking/{}/{}", metric, id);

    match state.tracking_service.delete_record(session.identity(), metric, &id).await {
        Ok(()) => {
            let response = DeleteRecordResponse {
                success_message: format!("{} record deleted", metric.label()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to delete {} record {}: {}", metric, id, e);
            error_response(&e)
        }
    }
}

pub async fn chart_series(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(metric): Path<Metric>,
    Query(query): Query<ChartQuery>,
) -> impl IntoResponse {
    info!("GET /api/tracking/{}/chart - limit: {:?}", metric, query.limit);

    match state.chart_service.chart_series(session.identity(), metric, query.limit).await {
        Ok(series) => (StatusCode::OK, Json(series)).into_response(),
        Err(e) => {
            error!("Failed to build {} chart: {}", metric, e);
            error_response(&e)
        }
    }
}
