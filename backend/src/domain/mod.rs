//! # Domain Module
//!
//! Contains all business logic for the care tracker.
//!
//! The domain layer knows nothing about HTTP. It talks to storage only through
//! the [`DocumentStore`](crate::storage::DocumentStore) trait and receives the
//! caller's identity explicitly on every operation.
//!
//! ## Module Organization
//!
//! - **tracking_service**: load, save and delete observations for any metric
//! - **tracking_controller**: per-metric screen state built on the service
//! - **ordering**: ordered query with a local-sort fallback
//! - **chart_service**: chart series for the most recent observations
//! - **export_service**: data summary, CSV and text exports
//! - **journal_service**: free-text journal entries
//! - **session**: identity and locale context
//!
//! ## Business Rules
//!
//! - Every collection is scoped to exactly one identity
//! - Records are never edited in place; only created and deleted
//! - Invalid field input is dropped, never stored as zero
//! - Lists are newest first by `createdAt`, falling back to `date`

pub mod chart_service;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod journal_service;
pub mod models;
pub mod ordering;
pub mod session;
pub mod tracking_controller;
pub mod tracking_service;

pub use chart_service::ChartService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::TrackingError;
pub use export_service::ExportService;
pub use journal_service::JournalService;
pub use session::{Identity, LocaleContext, SessionContext};
pub use tracking_controller::{ControllerPhase, TrackingController, TrackingNotice};
pub use tracking_service::{TrackingService, TrackingSnapshot};
