//! # REST API Interface Layer
//!
//! HTTP endpoints for the care tracker, nested under `/api`:
//!
//! - `/tracking/:metric` records, deletion and chart series
//! - `/export` data summary and CSV/text payloads
//! - `/journal` journal entries
//! - `/locale` display language
//!
//! Every handler builds a [`SessionContext`] from the `x-user-id` header and
//! passes the identity to the domain explicitly. Domain errors map to
//! `401` (no identity), `400` (validation) or `500`, always with an
//! `{ "error": ... }` body.

pub mod export_apis;
pub mod journal_apis;
pub mod locale_apis;
pub mod mappers;
pub mod tracking_apis;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use std::convert::Infallible;

use crate::domain::{SessionContext, TrackingError};

/// Header carrying the identity issued by the external session provider
pub const USER_ID_HEADER: &str = "x-user-id";

/// Session of the calling user. Missing or invalid ids give an anonymous session.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(CurrentSession(SessionContext::from_user_id(user_id)))
    }
}

pub fn status_for(error: &TrackingError) -> StatusCode {
    match error {
        TrackingError::Unauthenticated => StatusCode::UNAUTHORIZED,
        TrackingError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(error: &TrackingError) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
    };
    (status_for(error), Json(body)).into_response()
}
