// models/src/medical/medical_record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clinical record owned by a patient. The doctor reference is optional
/// and nulled out when the doctor is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: u32,
    pub patient_id: Uuid,
    pub doctor_id: Option<u32>,
    /// e.g. Consultation, Lab Report, Prescription
    pub record_type: String,
    pub description: String,
    /// Path of an uploaded report or image, when attached.
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a `MedicalRecord`; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicalRecord {
    pub patient_id: Uuid,
    pub doctor_id: Option<u32>,
    pub record_type: String,
    pub description: String,
    pub document: Option<String>,
}
