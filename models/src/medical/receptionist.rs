// models/src/medical/receptionist.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role profile for receptionists, keyed 1:1 to an `Account`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptionistProfile {
    pub id: u32,
    pub account_id: Uuid,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Set at creation.
    pub join_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a `ReceptionistProfile`; the store assigns id, join_date and
/// timestamps, and new receptionists start active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReceptionistProfile {
    pub account_id: Uuid,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}
