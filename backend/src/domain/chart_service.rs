//! Chart series built from tracking records.
//!
//! Records are loaded oldest first with the usual ordering fallback, filtered
//! to those that carry the charted value and cut down to the most recent
//! points.

use chrono::Datelike;
use shared::{ChartPoint, ChartSeries, Metric};
use tracing::debug;

use super::errors::TrackingError;
use super::models::observation::{field_schema, Observation, Reading};
use super::models::timestamp::parse_timestamp;
use super::session::Identity;
use super::tracking_service::TrackingService;
use crate::storage::SortDirection;

pub const DEFAULT_CHART_POINTS: usize = 7;

#[derive(Clone)]
pub struct ChartService {
    tracking_service: TrackingService,
}

impl ChartService {
    pub fn new(tracking_service: TrackingService) -> Self {
        Self { tracking_service }
    }

    /// The last `limit` charted points for a metric, oldest first
    pub async fn chart_series(
        &self,
        identity: Option<&Identity>,
        metric: Metric,
        limit: Option<usize>,
    ) -> Result<ChartSeries, TrackingError> {
        let limit = limit.unwrap_or(DEFAULT_CHART_POINTS);
        let records = self
            .tracking_service
            .load_records_ordered(identity, metric, SortDirection::Ascending)
            .await?;

        let mut points: Vec<ChartPoint> = records.iter().filter_map(chart_point).collect();
        let skip = points.len().saturating_sub(limit);
        points.drain(..skip);
        debug!(metric = %metric, points = points.len(), "chart series built");

        Ok(ChartSeries {
            metric,
            unit: chart_unit(metric).to_string(),
            series_names: series_names(metric),
            points,
        })
    }
}

fn chart_unit(metric: Metric) -> &'static str {
    field_schema(metric)
        .iter()
        .find_map(|spec| spec.unit)
        .unwrap_or_default()
}

fn series_names(metric: Metric) -> Vec<String> {
    let names: &[&str] = match metric {
        Metric::Feeding => &["amount"],
        Metric::Weight => &["weight"],
        Metric::BloodPressure => &["systolic", "diastolic"],
        Metric::PulseOx => &["pulseOx"],
    };
    names.iter().map(|name| name.to_string()).collect()
}

/// `None` when the record has nothing to plot
fn chart_point(observation: &Observation) -> Option<ChartPoint> {
    let values = match observation.reading {
        Reading::Feeding { amount_ml, .. } => vec![Some(amount_ml?)],
        Reading::Weight { weight_kg } => vec![Some(weight_kg?)],
        Reading::BloodPressure { systolic, diastolic } => {
            if systolic.is_none() && diastolic.is_none() {
                return None;
            }
            vec![systolic, diastolic]
        }
        Reading::PulseOx { saturation } => vec![Some(saturation?)],
    };
    Some(ChartPoint {
        label: point_label(observation),
        values,
    })
}

/// Month/day label such as `3/7`; empty when no date can be read
fn point_label(observation: &Observation) -> String {
    Some(observation.date.as_str())
        .filter(|date| !date.is_empty())
        .or(observation.created_at.as_deref())
        .and_then(parse_timestamp)
        .map(|ts| format!("{}/{}", ts.month(), ts.day()))
        .unwrap_or_default()
}
