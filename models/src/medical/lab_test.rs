// models/src/medical/lab_test.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Lab test order progression. The order below mirrors the workflow but
/// transitions are not strictly enforced; labs routinely skip steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabTestStatus {
    PendingSample,
    SampleCollected,
    InProgress,
    PendingReview,
    Completed,
    Cancelled,
}

impl LabTestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabTestStatus::PendingSample => "PENDING_SAMPLE",
            LabTestStatus::SampleCollected => "SAMPLE_COLLECTED",
            LabTestStatus::InProgress => "IN_PROGRESS",
            LabTestStatus::PendingReview => "PENDING_REVIEW",
            LabTestStatus::Completed => "COMPLETED",
            LabTestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for LabTestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabTestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING_SAMPLE" => Ok(LabTestStatus::PendingSample),
            "SAMPLE_COLLECTED" => Ok(LabTestStatus::SampleCollected),
            "IN_PROGRESS" => Ok(LabTestStatus::InProgress),
            "PENDING_REVIEW" => Ok(LabTestStatus::PendingReview),
            "COMPLETED" => Ok(LabTestStatus::Completed),
            "CANCELLED" => Ok(LabTestStatus::Cancelled),
            other => Err(ValidationError::invalid("status", format!("unknown status '{other}'"))),
        }
    }
}

/// A lab test ordered for a patient, optionally by a doctor and optionally
/// tied to an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestOrder {
    pub id: u32,
    pub patient_id: Uuid,
    pub ordered_by_doctor_id: Option<u32>,
    pub appointment_id: Option<u32>,
    pub test_name: String,
    pub status: LabTestStatus,
    pub order_datetime: DateTime<Utc>,
    pub sample_collection_datetime: Option<DateTime<Utc>>,
    pub results_expected_datetime: Option<DateTime<Utc>>,
    pub results_ready_datetime: Option<DateTime<Utc>>,
    pub result_summary: Option<String>,
    pub result_document: Option<String>,
    pub actual_cost: Option<f64>,
    pub notes_by_doctor: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a `LabTestOrder`; the store assigns id, order time and status
/// defaults to pending sample collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLabTestOrder {
    pub patient_id: Uuid,
    pub ordered_by_doctor_id: Option<u32>,
    pub appointment_id: Option<u32>,
    pub test_name: String,
    pub results_expected_datetime: Option<DateTime<Utc>>,
    pub actual_cost: Option<f64>,
    pub notes_by_doctor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_order_statuses_by_progression() {
        assert!(LabTestStatus::PendingSample < LabTestStatus::SampleCollected);
        assert!(LabTestStatus::InProgress < LabTestStatus::PendingReview);
        assert!(LabTestStatus::PendingReview < LabTestStatus::Completed);
    }

    #[test]
    fn should_round_trip_wire_names() {
        assert_eq!("PENDING_SAMPLE".parse::<LabTestStatus>().unwrap(), LabTestStatus::PendingSample);
        assert_eq!(LabTestStatus::SampleCollected.to_string(), "SAMPLE_COLLECTED");
    }
}
