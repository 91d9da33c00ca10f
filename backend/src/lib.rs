//! # Care Tracker Backend
//!
//! Non-UI logic for the caregiver health tracker.
//!
//! ## Architecture
//!
//! ```text
//! Clients (mobile app)
//!     ↓
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (tracking, charts, export, journal)
//!     ↓
//! Storage Layer (document store: memory or YAML files)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the application state from [`config::AppConfig`]
//! - Set up the REST router with CORS and request tracing
//! - Keep every collection scoped to the identity of the caller

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, ServerConfig, StorageBackend};
use crate::domain::{
    ChartService, Clock, ExportService, JournalService, LocaleContext, SystemClock, TrackingService,
};
use crate::io::rest::{export_apis, journal_apis, locale_apis, tracking_apis};
use crate::storage::{DocumentStore, FileConnection, FileDocumentStore, MemoryDocumentStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub tracking_service: TrackingService,
    pub chart_service: ChartService,
    pub export_service: ExportService,
    pub journal_service: JournalService,
    pub locale: Arc<RwLock<LocaleContext>>,
}

impl AppState {
    /// Wire every service onto one store and clock
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        let tracking_service = TrackingService::new(store.clone(), clock.clone());
        Self {
            chart_service: ChartService::new(tracking_service.clone()),
            export_service: ExportService::new(tracking_service.clone()),
            journal_service: JournalService::new(store, clock),
            tracking_service,
            locale: Arc::new(RwLock::new(LocaleContext::default())),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
        StorageBackend::File => {
            let data_dir = config.storage.resolved_data_dir()?;
            info!("Using file document store at {}", data_dir.display());
            let connection = FileConnection::new(&data_dir)
                .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
            Arc::new(FileDocumentStore::new(connection))
        }
    };

    info!("Setting up application state");
    Ok(AppState::new(store, Arc::new(SystemClock)))
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let origin = if server.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = server
            .allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin {origin:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, server: &ServerConfig) -> Result<Router> {
    let api_routes = Router::new()
        .nest("/tracking", tracking_apis::router())
        .nest("/export", export_apis::router())
        .nest("/journal", journal_apis::router())
        .nest("/locale", locale_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer(server)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
