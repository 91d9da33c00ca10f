//! # REST API for the display language

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::LocaleResponse;
use tracing::info;

use crate::domain::LocaleContext;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_locale))
        .route("/toggle", post(toggle_locale))
}

fn to_response(locale: &LocaleContext) -> LocaleResponse {
    LocaleResponse {
        language: locale.language(),
        is_rtl: locale.is_rtl(),
    }
}

pub async fn get_locale(State(state): State<AppState>) -> impl IntoResponse {
    let locale = state.locale.read().await;
    Json(to_response(&locale))
}

pub async fn toggle_locale(State(state): State<AppState>) -> impl IntoResponse {
    let mut locale = state.locale.write().await;
    let language = locale.toggle();
    info!("POST /api/locale/toggle - now {:?}", language);
    Json(to_response(&locale))
}
