use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Health metric tracked by the caregiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Feeding,
    Weight,
    BloodPressure,
    PulseOx,
}

impl Metric {
    /// All metrics in export order
    pub const ALL: [Metric; 4] = [
        Metric::Feeding,
        Metric::Weight,
        Metric::BloodPressure,
        Metric::PulseOx,
    ];

    /// Human-readable label, also used as the `Type` column of CSV exports
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Feeding => "Feeding",
            Metric::Weight => "Weight",
            Metric::BloodPressure => "Blood Pressure",
            Metric::PulseOx => "Pulse Ox",
        }
    }

    /// Identifier used in URLs and JSON
    pub fn slug(&self) -> &'static str {
        match self {
            Metric::Feeding => "feeding",
            Metric::Weight => "weight",
            Metric::BloodPressure => "blood_pressure",
            Metric::PulseOx => "pulse_ox",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// How a feeding was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedingType {
    Breast,
    Bottle,
}

impl FeedingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedingType::Breast => "breast",
            FeedingType::Bottle => "bottle",
        }
    }
}

/// A stored observation as returned to clients.
///
/// Metric fields that were not recorded are omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub id: String,
    pub metric: Metric,
    /// Observation date (ISO 8601, UTC)
    pub date: String,
    /// Save timestamp (ISO 8601, UTC); may be missing on legacy documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub feeding_type: Option<FeedingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_ox: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub metric: Metric,
    pub records: Vec<TrackingRecord>,
}

/// Raw form input for a new record.
///
/// `values` maps wire field names (`amount`, `time`, `type`, `weight`,
/// `systolic`, `diastolic`, `pulseOx`) to the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveRecordRequest {
    /// Observation date (RFC 3339 or YYYY-MM-DD); defaults to now
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecordResponse {
    pub success_message: String,
}

/// Number of stored records per metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSummary {
    pub feeding: usize,
    pub weight: usize,
    pub blood_pressure: usize,
    pub pulse_ox: usize,
}

impl DataSummary {
    pub fn total(&self) -> usize {
        self.feeding + self.weight + self.blood_pressure + self.pulse_ox
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Text,
}

/// Export content handed to the platform share sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub title: String,
    pub format: ExportFormat,
    pub content: String,
    pub record_count: usize,
    /// Suggested file name if the client decides to save the content
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Short `M/D` label
    pub label: String,
    /// One value per series; blood pressure carries systolic then diastolic
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub unit: String,
    pub series_names: Vec<String>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJournalEntryRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalListResponse {
    pub entries: Vec<JournalEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleResponse {
    pub language: Language,
    pub is_rtl: bool,
}

/// Error body returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
