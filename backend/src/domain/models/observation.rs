//! Observation records and the per-metric field schema.
//!
//! Every metric declares the optional fields it understands. The schema is
//! used in both directions: to sanitize raw form input before a save, and to
//! decode the flat documents that come back from the store. A field that does
//! not validate is dropped, never stored as zero or NaN.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};
use shared::{FeedingType, Metric};
use std::collections::BTreeMap;
use tracing::debug;

use super::timestamp::format_timestamp;
use crate::domain::commands::tracking::RecordForm;
use crate::storage::{Document, StoredDocument};

pub const DATE_FIELD: &str = "date";
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Must parse to a finite number
    Number,
    /// Any non-empty trimmed text
    Text,
    /// One of a fixed set of lowercase values
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub unit: Option<&'static str>,
    /// Value used when the form leaves the field blank
    pub default: Option<&'static str>,
}

const FEEDING_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "time",
        kind: FieldKind::Text,
        unit: None,
        default: None,
    },
    FieldSpec {
        name: "amount",
        kind: FieldKind::Number,
        unit: Some("ml"),
        default: None,
    },
    FieldSpec {
        name: "type",
        kind: FieldKind::Choice(&["breast", "bottle"]),
        unit: None,
        default: Some("breast"),
    },
];

const WEIGHT_FIELDS: [FieldSpec; 1] = [
    FieldSpec {
        name: "weight",
        kind: FieldKind::Number,
        unit: Some("kg"),
        default: None,
    },
];

const BLOOD_PRESSURE_FIELDS: [FieldSpec; 2] = [
    FieldSpec {
        name: "systolic",
        kind: FieldKind::Number,
        unit: Some("mmHg"),
        default: None,
    },
    FieldSpec {
        name: "diastolic",
        kind: FieldKind::Number,
        unit: Some("mmHg"),
        default: None,
    },
];

const PULSE_OX_FIELDS: [FieldSpec; 1] = [
    FieldSpec {
        name: "pulseOx",
        kind: FieldKind::Number,
        unit: Some("%"),
        default: None,
    },
];

pub fn field_schema(metric: Metric) -> &'static [FieldSpec] {
    match metric {
        Metric::Feeding => &FEEDING_FIELDS,
        Metric::Weight => &WEIGHT_FIELDS,
        Metric::BloodPressure => &BLOOD_PRESSURE_FIELDS,
        Metric::PulseOx => &PULSE_OX_FIELDS,
    }
}

/// Fields whose form value is kept after a save (the ones with a default)
pub fn sticky_fields(metric: Metric) -> Vec<&'static str> {
    field_schema(metric)
        .iter()
        .filter(|spec| spec.default.is_some())
        .map(|spec| spec.name)
        .collect()
}

/// Store collection holding a metric's records
pub fn collection_name(metric: Metric) -> &'static str {
    match metric {
        Metric::Feeding => "trackingfeeding",
        Metric::Weight => "trackingweight",
        Metric::BloodPressure => "trackingblood",
        Metric::PulseOx => "trackingpulse",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Number(n) => Number::from_f64(*n).map(Value::Number),
            FieldValue::Text(s) => Some(Value::String(s.clone())),
        }
    }
}

/// Validated fields keyed by wire name
pub type FieldSet = BTreeMap<&'static str, FieldValue>;

impl FieldSpec {
    /// Validate raw user input. `None` means the field is not recorded.
    pub fn validate(&self, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self.kind {
            FieldKind::Number => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(FieldValue::Number),
            FieldKind::Text => Some(FieldValue::Text(trimmed.to_string())),
            FieldKind::Choice(allowed) => {
                let lowered = trimmed.to_ascii_lowercase();
                allowed
                    .iter()
                    .find(|choice| **choice == lowered)
                    .map(|choice| FieldValue::Text((*choice).to_string()))
            }
        }
    }

    /// Decode a stored value, tolerating numbers saved as numeric strings
    pub fn decode(&self, value: &Value) -> Option<FieldValue> {
        match (self.kind, value) {
            (FieldKind::Number, Value::Number(n)) => n
                .as_f64()
                .filter(|value| value.is_finite())
                .map(FieldValue::Number),
            (_, Value::String(s)) => self.validate(s),
            _ => None,
        }
    }
}

/// Apply the metric's schema to raw form values
pub fn sanitize_fields(metric: Metric, values: &BTreeMap<String, String>) -> FieldSet {
    let mut fields = FieldSet::new();
    for spec in field_schema(metric) {
        let raw = values
            .get(spec.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .or(spec.default);
        let Some(raw) = raw else { continue };
        match spec.validate(raw) {
            Some(value) => {
                fields.insert(spec.name, value);
            }
            None => {
                debug!(metric = %metric, field = spec.name, "dropping field that failed validation")
            }
        }
    }
    fields
}

/// Metric-specific payload of an observation. `None` means "not recorded".
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Feeding {
        time: Option<String>,
        amount_ml: Option<f64>,
        feeding_type: Option<FeedingType>,
    },
    Weight {
        weight_kg: Option<f64>,
    },
    BloodPressure {
        systolic: Option<f64>,
        diastolic: Option<f64>,
    },
    PulseOx {
        saturation: Option<f64>,
    },
}

fn parse_feeding_type(raw: &str) -> Option<FeedingType> {
    match raw {
        "breast" => Some(FeedingType::Breast),
        "bottle" => Some(FeedingType::Bottle),
        _ => None,
    }
}

impl Reading {
    pub fn metric(&self) -> Metric {
        match self {
            Reading::Feeding { .. } => Metric::Feeding,
            Reading::Weight { .. } => Metric::Weight,
            Reading::BloodPressure { .. } => Metric::BloodPressure,
            Reading::PulseOx { .. } => Metric::PulseOx,
        }
    }

    pub fn from_fields(metric: Metric, fields: &FieldSet) -> Self {
        let number = |name: &str| fields.get(name).and_then(FieldValue::as_number);
        let text = |name: &str| fields.get(name).and_then(FieldValue::as_text);
        match metric {
            Metric::Feeding => Reading::Feeding {
                time: text("time").map(str::to_string),
                amount_ml: number("amount"),
                feeding_type: text("type").and_then(parse_feeding_type),
            },
            Metric::Weight => Reading::Weight {
                weight_kg: number("weight"),
            },
            Metric::BloodPressure => Reading::BloodPressure {
                systolic: number("systolic"),
                diastolic: number("diastolic"),
            },
            Metric::PulseOx => Reading::PulseOx {
                saturation: number("pulseOx"),
            },
        }
    }

    /// Recorded fields only, keyed by wire name
    pub fn to_fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        let mut put_number = |name: &'static str, value: Option<f64>| {
            if let Some(value) = value {
                fields.insert(name, FieldValue::Number(value));
            }
        };
        match self {
            Reading::Feeding { amount_ml, .. } => put_number("amount", *amount_ml),
            Reading::Weight { weight_kg } => put_number("weight", *weight_kg),
            Reading::BloodPressure { systolic, diastolic } => {
                put_number("systolic", *systolic);
                put_number("diastolic", *diastolic);
            }
            Reading::PulseOx { saturation } => put_number("pulseOx", *saturation),
        }
        if let Reading::Feeding { time, feeding_type, .. } = self {
            if let Some(time) = time {
                fields.insert("time", FieldValue::Text(time.clone()));
            }
            if let Some(feeding_type) = feeding_type {
                fields.insert("type", FieldValue::Text(feeding_type.as_str().to_string()));
            }
        }
        fields
    }
}

/// One timestamped measurement for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Assigned by the store; `None` until saved
    pub id: Option<String>,
    /// Observation date chosen by the caller (ISO 8601)
    pub date: String,
    /// Save timestamp (ISO 8601); missing only on legacy documents
    pub created_at: Option<String>,
    pub reading: Reading,
}

impl Observation {
    /// Build a new, unsaved observation from form input
    pub fn from_form(metric: Metric, form: &RecordForm, created_at: DateTime<Utc>) -> Self {
        let fields = sanitize_fields(metric, &form.values);
        Self {
            id: None,
            date: format_timestamp(&form.date),
            created_at: Some(format_timestamp(&created_at)),
            reading: Reading::from_fields(metric, &fields),
        }
    }

    pub fn metric(&self) -> Metric {
        self.reading.metric()
    }

    /// Flat document as persisted: `date`, `createdAt` and recorded fields only
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert(DATE_FIELD.to_string(), Value::String(self.date.clone()));
        if let Some(created_at) = &self.created_at {
            document.insert(CREATED_AT_FIELD.to_string(), Value::String(created_at.clone()));
        }
        for (name, value) in self.reading.to_fields() {
            if let Some(json) = value.to_json() {
                document.insert(name.to_string(), json);
            }
        }
        document
    }

    pub fn from_stored(metric: Metric, stored: StoredDocument) -> Self {
        let data = &stored.data;
        let string_field = |name: &str| {
            data.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut fields = FieldSet::new();
        for spec in field_schema(metric) {
            if let Some(value) = data.get(spec.name).and_then(|v| spec.decode(v)) {
                fields.insert(spec.name, value);
            }
        }

        Self {
            date: string_field(DATE_FIELD).unwrap_or_default(),
            created_at: string_field(CREATED_AT_FIELD),
            reading: Reading::from_fields(metric, &fields),
            id: Some(stored.id),
        }
    }
}
