use shared::{Metric, RecordListResponse, TrackingRecord};

use crate::domain::models::observation::{Observation, Reading};

pub struct ObservationMapper;

impl ObservationMapper {
    /// Convert a domain observation to the wire record. Unrecorded fields stay `None`.
    pub fn to_dto(domain: Observation) -> TrackingRecord {
        let metric = domain.metric();
        let mut record = TrackingRecord {
            id: domain.id.unwrap_or_default(),
            metric,
            date: domain.date,
            created_at: domain.created_at,
            time: None,
            amount: None,
            feeding_type: None,
            weight: None,
            systolic: None,
            diastolic: None,
            pulse_ox: None,
        };
        match domain.reading {
            Reading::Feeding { time, amount_ml, feeding_type } => {
                record.time = time;
                record.amount = amount_ml;
                record.feeding_type = feeding_type;
            }
            Reading::Weight { weight_kg } => record.weight = weight_kg,
            Reading::BloodPressure { systolic, diastolic } => {
                record.systolic = systolic;
                record.diastolic = diastolic;
            }
            Reading::PulseOx { saturation } => record.pulse_ox = saturation,
        }
        record
    }

    pub fn to_list_response(metric: Metric, records: Vec<Observation>) -> RecordListResponse {
        RecordListResponse {
            metric,
            records: records.into_iter().map(Self::to_dto).collect(),
        }
    }
}
