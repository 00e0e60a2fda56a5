// models/src/medical/bill.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "PENDING",
            BillStatus::Paid => "PAID",
            BillStatus::Overdue => "OVERDUE",
            BillStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" | "UNPAID" => Ok(BillStatus::Pending),
            "PAID" => Ok(BillStatus::Paid),
            "OVERDUE" => Ok(BillStatus::Overdue),
            "CANCELLED" => Ok(BillStatus::Cancelled),
            other => Err(ValidationError::invalid("status", format!("unknown status '{other}'"))),
        }
    }
}

/// An invoice tied to a patient and optionally to an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: u32,
    pub patient_id: Uuid,
    pub appointment_id: Option<u32>,
    pub amount: f64,
    pub description: String,
    pub status: BillStatus,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a `Bill`; the store assigns id, bill date and timestamps, and
/// new bills start pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBill {
    pub patient_id: Uuid,
    pub appointment_id: Option<u32>,
    pub amount: f64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_unpaid_as_alias_for_pending() {
        assert_eq!("UNPAID".parse::<BillStatus>().unwrap(), BillStatus::Pending);
        assert_eq!("pending".parse::<BillStatus>().unwrap(), BillStatus::Pending);
    }
}
