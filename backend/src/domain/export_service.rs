//! Export service domain logic.
//!
//! Builds the data summary and the two share-sheet payloads (CSV and plain
//! text) from an unordered snapshot of every tracking collection. Nothing is
//! written to disk; the caller decides what to do with the content.
//!
//! Sections always appear in the order Feeding, Weight, Blood Pressure,
//! Pulse Ox.

use chrono::{DateTime, Utc};
use shared::{DataSummary, ExportFormat, ExportPayload, Metric};
use std::fmt::Write as _;
use tracing::{error, info};

use super::errors::TrackingError;
use super::models::observation::{Observation, Reading};
use super::models::timestamp::parse_timestamp;
use super::session::Identity;
use super::tracking_service::{TrackingService, TrackingSnapshot};

pub const CSV_HEADER: [&str; 6] = ["Type", "Date", "Time", "Value1", "Value2", "Type/Notes"];
pub const EXPORT_TITLE: &str = "Child Health Data Export";

const TEXT_BANNER: &str = "CHILD HEALTH DATA EXPORT";
const SECTION_RULE: &str = "----------------------------";
const MISSING: &str = "N/A";

#[derive(Clone)]
pub struct ExportService {
    tracking_service: TrackingService,
}

impl ExportService {
    pub fn new(tracking_service: TrackingService) -> Self {
        Self { tracking_service }
    }

    /// Record counts per metric. No identity means all zero.
    pub async fn data_summary(
        &self,
        identity: Option<&Identity>,
    ) -> Result<DataSummary, TrackingError> {
        let Some(identity) = identity else {
            return Ok(DataSummary::default());
        };
        let snapshot = self.tracking_service.fetch_all(identity).await?;
        Ok(DataSummary {
            feeding: snapshot.feeding.len(),
            weight: snapshot.weight.len(),
            blood_pressure: snapshot.blood_pressure.len(),
            pulse_ox: snapshot.pulse_ox.len(),
        })
    }

    pub async fn export_csv(
        &self,
        identity: Option<&Identity>,
    ) -> Result<ExportPayload, TrackingError> {
        let identity = identity.ok_or(TrackingError::Unauthenticated)?;
        let snapshot = self.tracking_service.fetch_all(identity).await?;
        let content = render_csv(&snapshot)?;
        info!(records = snapshot.total(), "CSV export built");

        Ok(ExportPayload {
            title: EXPORT_TITLE.to_string(),
            format: ExportFormat::Csv,
            content,
            record_count: snapshot.total(),
            filename: export_filename(self.tracking_service.clock().now(), ExportFormat::Csv),
        })
    }

    pub async fn export_text(
        &self,
        identity: Option<&Identity>,
    ) -> Result<ExportPayload, TrackingError> {
        let identity = identity.ok_or(TrackingError::Unauthenticated)?;
        let snapshot = self.tracking_service.fetch_all(identity).await?;
        let now = self.tracking_service.clock().now();
        let content = render_text(&snapshot, now);
        info!(records = snapshot.total(), "text export built");

        Ok(ExportPayload {
            title: format!("{EXPORT_TITLE} (Text)"),
            format: ExportFormat::Text,
            content,
            record_count: snapshot.total(),
            filename: export_filename(now, ExportFormat::Text),
        })
    }
}

pub fn export_filename(now: DateTime<Utc>, format: ExportFormat) -> String {
    let extension = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Text => "txt",
    };
    format!("child_health_data_{}.{}", now.format("%Y%m%d"), extension)
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn csv_row(observation: &Observation) -> [String; 6] {
    let label = observation.metric().label().to_string();
    let date = observation.date.clone();
    match &observation.reading {
        Reading::Feeding { time, amount_ml, feeding_type } => [
            label,
            date,
            time.clone().unwrap_or_default(),
            number_cell(*amount_ml),
            String::new(),
            feeding_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
        ],
        Reading::Weight { weight_kg } => {
            [label, date, String::new(), number_cell(*weight_kg), String::new(), String::new()]
        }
        Reading::BloodPressure { systolic, diastolic } => [
            label,
            date,
            String::new(),
            number_cell(*systolic),
            number_cell(*diastolic),
            String::new(),
        ],
        Reading::PulseOx { saturation } => {
            [label, date, String::new(), number_cell(*saturation), String::new(), String::new()]
        }
    }
}

/// Header plus one row per record, quoted where needed
pub fn render_csv(snapshot: &TrackingSnapshot) -> Result<String, TrackingError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let write_failed = |e: csv::Error| {
        error!(error = %e, "failed to write CSV export");
        TrackingError::ExportFailed(e.to_string())
    };

    writer.write_record(CSV_HEADER).map_err(write_failed)?;
    for metric in Metric::ALL {
        for observation in snapshot.records(metric) {
            writer.write_record(csv_row(observation)).map_err(write_failed)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TrackingError::ExportFailed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TrackingError::ExportFailed(e.to_string()))
}

fn text_number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| MISSING.to_string())
}

/// Dates render like `Mon Jan 01 2024`
fn text_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn write_text_block(out: &mut String, observation: &Observation) {
    let _ = writeln!(out, "Date: {}", text_date(&observation.date));
    match &observation.reading {
        Reading::Feeding { time, amount_ml, feeding_type } => {
            let _ = writeln!(out, "Time: {}", time.as_deref().unwrap_or(MISSING));
            let _ = writeln!(out, "Amount: {}ml", text_number(*amount_ml));
            let _ = writeln!(out, "Type: {}", feeding_type.map(|t| t.as_str()).unwrap_or(MISSING));
        }
        Reading::Weight { weight_kg } => {
            let _ = writeln!(out, "Weight: {}kg", text_number(*weight_kg));
        }
        Reading::BloodPressure { systolic, diastolic } => {
            let _ = writeln!(
                out,
                "Systolic: {} / Diastolic: {}",
                text_number(*systolic),
                text_number(*diastolic)
            );
        }
        Reading::PulseOx { saturation } => {
            let _ = writeln!(out, "Pulse Ox: {}%", text_number(*saturation));
        }
    }
    out.push('\n');
}

/// Human readable export with one section per metric
pub fn render_text(snapshot: &TrackingSnapshot, exported_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(TEXT_BANNER);
    out.push('\n');
    out.push_str(&"=".repeat(TEXT_BANNER.len()));
    out.push_str("\n\n");

    for metric in Metric::ALL {
        let records = snapshot.records(metric);
        let _ = writeln!(out, "{} RECORDS ({})", metric.label().to_uppercase(), records.len());
        out.push_str(SECTION_RULE);
        out.push('\n');
        for observation in records {
            write_text_block(&mut out, observation);
        }
    }

    let _ = writeln!(out, "\nExported on: {}", exported_at.format("%Y-%m-%d %H:%M:%S UTC"));
    out
}
