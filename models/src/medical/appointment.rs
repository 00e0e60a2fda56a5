// models/src/medical/appointment.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Appointment lifecycle. `Completed` and `Cancelled` are terminal; no
/// transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Requested,
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Legal transitions: Requested -> Scheduled -> Confirmed -> Completed,
    /// plus Requested -> Confirmed (staff may confirm directly) and any
    /// non-terminal state -> Cancelled.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match (self, next) {
            (_, Cancelled) => !self.is_terminal(),
            (Requested, Scheduled) | (Requested, Confirmed) => true,
            (Scheduled, Confirmed) => true,
            (Scheduled, Completed) | (Confirmed, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "REQUESTED",
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(AppointmentStatus::Requested),
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            other => Err(ValidationError::invalid("status", format!("unknown status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u32,
    pub patient_id: Uuid,
    pub doctor_id: u32,
    pub appointment_datetime: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Applies a status transition, enforcing the state machine. Refreshes
    /// `updated_at` on success; terminal states are left untouched on error.
    pub fn transition(&mut self, next: AppointmentStatus) -> Result<(), ValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(ValidationError::IllegalTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels the appointment; rejected from terminal states.
    pub fn cancel(&mut self) -> Result<(), ValidationError> {
        self.transition(AppointmentStatus::Cancelled)
    }
}

/// Input for a new appointment; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: u32,
    pub appointment_datetime: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: 1,
            patient_id: Uuid::new_v4(),
            doctor_id: 7,
            appointment_datetime: now,
            reason: Some("checkup".to_string()),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn should_walk_the_happy_path() {
        let mut appt = appointment(AppointmentStatus::Requested);
        appt.transition(AppointmentStatus::Scheduled).unwrap();
        appt.transition(AppointmentStatus::Confirmed).unwrap();
        appt.transition(AppointmentStatus::Completed).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Completed);
    }

    #[test]
    fn should_cancel_from_any_non_terminal_state() {
        for status in [
            AppointmentStatus::Requested,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
        ] {
            let mut appt = appointment(status);
            appt.cancel().unwrap();
            assert_eq!(appt.status, AppointmentStatus::Cancelled);
        }
    }

    #[test]
    fn should_reject_cancel_from_terminal_states() {
        for status in [AppointmentStatus::Completed, AppointmentStatus::Cancelled] {
            let mut appt = appointment(status);
            assert!(appt.cancel().is_err());
            assert_eq!(appt.status, status, "status must be unchanged on rejection");
        }
    }

    #[test]
    fn should_reject_backwards_transitions() {
        let mut appt = appointment(AppointmentStatus::Confirmed);
        assert!(appt.transition(AppointmentStatus::Requested).is_err());
        assert!(appt.transition(AppointmentStatus::Scheduled).is_err());
    }
}
