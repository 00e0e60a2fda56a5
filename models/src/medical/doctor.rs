// models/src/medical/doctor.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role profile for doctors, keyed 1:1 to an `Account`. Name fields are
/// denormalized from the account at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: u32,
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub department: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a `DoctorProfile`; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctorProfile {
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub department: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}
