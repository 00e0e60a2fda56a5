// models/src/medical/patient.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::gender::Gender;

/// Role profile for patients, keyed 1:1 to an `Account`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Primary key; the id of the owning account.
    pub account_id: Uuid,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    /// Account that registered this profile (admin or receptionist), when
    /// not self-registered. Scopes what a receptionist may later touch.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientProfile {
    pub fn new(
        account_id: Uuid,
        date_of_birth: NaiveDate,
        gender: Gender,
        contact_number: Option<String>,
        address: Option<String>,
        created_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        PatientProfile {
            account_id,
            date_of_birth,
            gender,
            contact_number,
            address,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Denormalized patient record in the older registry schema, kept in sync
/// with `PatientProfile` for backward compatibility. Created best-effort at
/// registration; its absence is a tolerated inconsistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPatientRecord {
    pub id: u32,
    /// Unique registry number in the old schema.
    pub reg_num: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

/// Input for a `LegacyPatientRecord`; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLegacyPatientRecord {
    pub reg_num: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}
