// reminders/src/lib.rs
//
// Scheduled batch job: scan one day's appointments that are still
// Scheduled and emit a reminder line per appointment, plus a structured
// system log entry unless running dry. The "sending" is the emitted line;
// real delivery is someone else's problem.

use std::io::Write;

use chrono::{Duration, NaiveDate, Utc};
use thiserror::Error;

use models::{Appointment, AppointmentStatus, HmsError, LogLevel};
use storage::HmsStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default)]
pub struct ReminderOptions {
    /// Print what would be sent without writing any log entries.
    pub dry_run: bool,
    /// Target date (YYYY-MM-DD); tomorrow when absent.
    pub date: Option<String>,
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDate(String),
    #[error(transparent)]
    Storage(#[from] HmsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct ReminderOutcome {
    pub target_date: NaiveDate,
    pub appointments_found: usize,
    pub reminders_logged: usize,
}

async fn reminder_names(
    store: &dyn HmsStore,
    appointment: &Appointment,
) -> Result<(String, String, String), ReminderError> {
    let patient_account = store.get_account(appointment.patient_id).await?;
    let patient_name = patient_account
        .as_ref()
        .map(|a| a.full_name())
        .unwrap_or_else(|| appointment.patient_id.to_string());
    let patient_username = patient_account
        .map(|a| a.username)
        .unwrap_or_else(|| appointment.patient_id.to_string());
    let doctor_name = store
        .get_doctor(appointment.doctor_id)
        .await?
        .map(|d| format!("Dr. {}", d.last_name))
        .unwrap_or_else(|| format!("doctor {}", appointment.doctor_id));
    Ok((patient_name, patient_username, doctor_name))
}

/// Runs the reminder scan. Invalid date input is fatal: nothing is
/// processed and no log entries are written. An empty result set is a
/// normal outcome, announced explicitly.
pub async fn run(
    store: &dyn HmsStore,
    opts: &ReminderOptions,
    out: &mut impl Write,
) -> Result<ReminderOutcome, ReminderError> {
    let target_date = match opts.date.as_deref() {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| ReminderError::InvalidDate(raw.to_string()))?;
            writeln!(out, "Using specified date for reminders: {}", date.format(DATE_FORMAT))?;
            date
        }
        None => {
            let tomorrow = Utc::now().date_naive() + Duration::days(1);
            writeln!(
                out,
                "Checking for appointments on: {} (Tomorrow)",
                tomorrow.format(DATE_FORMAT)
            )?;
            tomorrow
        }
    };

    let appointments = store
        .list_appointments_on_date(target_date, AppointmentStatus::Scheduled)
        .await?;

    if appointments.is_empty() {
        writeln!(
            out,
            "No appointments found for {} that require reminders.",
            target_date.format(DATE_FORMAT)
        )?;
        return Ok(ReminderOutcome {
            target_date,
            appointments_found: 0,
            reminders_logged: 0,
        });
    }

    writeln!(
        out,
        "Found {} appointments for {}.",
        appointments.len(),
        target_date.format(DATE_FORMAT)
    )?;

    let mut reminders_logged = 0;
    for appointment in &appointments {
        let (patient_name, patient_username, doctor_name) =
            reminder_names(store, appointment).await?;
        let appointment_time = appointment.appointment_datetime.format("%I:%M %p");
        let reminder_message = format!(
            "Reminder for {patient_name}: Appointment with {doctor_name} on {} at {appointment_time}.",
            target_date.format("%A, %B %d, %Y"),
        );

        if opts.dry_run {
            writeln!(out, "[DRY RUN] Would send: {reminder_message}")?;
            continue;
        }

        writeln!(out, "SENT: {reminder_message}")?;
        let log_description = format!(
            "Sent appointment reminder for appointment ID {} (Patient: {patient_username}, Doctor: {doctor_name}, Time: {})",
            appointment.id,
            appointment.appointment_datetime.format("%Y-%m-%d %H:%M"),
        );
        match store.append_log(LogLevel::Info, &log_description).await {
            Ok(_) => reminders_logged += 1,
            Err(e) => writeln!(
                out,
                "Failed to log reminder for appointment ID {}: {e}",
                appointment.id
            )?,
        }
    }

    if opts.dry_run {
        writeln!(out, "Dry run complete. Would have processed {} appointments.", appointments.len())?;
    } else {
        writeln!(
            out,
            "Appointment reminder process finished. {reminders_logged} reminders logged."
        )?;
    }

    Ok(ReminderOutcome {
        target_date,
        appointments_found: appointments.len(),
        reminders_logged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::{
        Account, Gender, NewAccount, NewAppointment, NewDoctorProfile, PatientProfile, Role,
    };
    use storage::MemoryStore;
    use uuid::Uuid;

    async fn seeded_store() -> (MemoryStore, Uuid, u32) {
        let store = MemoryStore::new();
        let patient = Account::from_new_account(NewAccount {
            username: "alice".to_string(),
            password: "supersecret".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            role: Role::Patient,
        })
        .unwrap();
        let patient_id = patient.id;
        let profile = PatientProfile::new(
            patient_id,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            Gender::Female,
            None,
            None,
            None,
        );
        store.create_account_with_patient(patient, profile).await.unwrap();

        let doctor_account = Account::from_new_account(NewAccount {
            username: "drhouse".to_string(),
            password: "supersecret".to_string(),
            email: "house@example.com".to_string(),
            first_name: "Greg".to_string(),
            last_name: "House".to_string(),
            role: Role::Doctor,
        })
        .unwrap();
        let (_, doctor) = store
            .create_account_with_doctor(
                doctor_account.clone(),
                NewDoctorProfile {
                    account_id: doctor_account.id,
                    first_name: "Greg".to_string(),
                    last_name: "House".to_string(),
                    specialization: "Diagnostics".to_string(),
                    department: "Internal Medicine".to_string(),
                    contact_number: None,
                    email: None,
                },
            )
            .await
            .unwrap();
        (store, patient_id, doctor.id)
    }

    fn opts(date: &str, dry_run: bool) -> ReminderOptions {
        ReminderOptions { dry_run, date: Some(date.to_string()) }
    }

    #[tokio::test]
    async fn invalid_date_is_fatal_and_writes_nothing() {
        let (store, _, _) = seeded_store().await;
        let mut out = Vec::new();

        let err = run(&store, &opts("01-02-2099", false), &mut out).await.unwrap_err();
        assert!(matches!(err, ReminderError::InvalidDate(_)));
        assert!(store.list_logs(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_day_reports_none_found_and_logs_nothing() {
        let (store, _, _) = seeded_store().await;
        let mut out = Vec::new();

        let outcome = run(&store, &opts("2099-01-01", false), &mut out).await.unwrap();
        assert_eq!(outcome.appointments_found, 0);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("No appointments found for 2099-01-01"));
        assert!(store.list_logs(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scheduled_appointments_are_reminded_and_logged() {
        let (store, patient_id, doctor_id) = seeded_store().await;
        let when = Utc.with_ymd_and_hms(2099, 1, 2, 14, 30, 0).unwrap();
        let appointment = store
            .create_appointment(NewAppointment {
                patient_id,
                doctor_id,
                appointment_datetime: when,
                reason: None,
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();
        // a requested appointment on the same day gets no reminder
        store
            .create_appointment(NewAppointment {
                patient_id,
                doctor_id,
                appointment_datetime: when,
                reason: None,
                status: AppointmentStatus::Requested,
            })
            .await
            .unwrap();

        let mut out = Vec::new();
        let outcome = run(&store, &opts("2099-01-02", false), &mut out).await.unwrap();
        assert_eq!(outcome.appointments_found, 1);
        assert_eq!(outcome.reminders_logged, 1);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("SENT: Reminder for Alice Smith: Appointment with Dr. House"));
        assert!(output.contains("02:30 PM"));

        let logs = store.list_logs(None).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].message.contains(&format!("appointment ID {}", appointment.id)));
    }

    #[tokio::test]
    async fn dry_run_prints_but_does_not_log() {
        let (store, patient_id, doctor_id) = seeded_store().await;
        store
            .create_appointment(NewAppointment {
                patient_id,
                doctor_id,
                appointment_datetime: Utc.with_ymd_and_hms(2099, 1, 2, 9, 0, 0).unwrap(),
                reason: None,
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();

        let mut out = Vec::new();
        let outcome = run(&store, &opts("2099-01-02", true), &mut out).await.unwrap();
        assert_eq!(outcome.reminders_logged, 0);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("[DRY RUN] Would send:"));
        assert!(output.contains("Dry run complete."));
        assert!(store.list_logs(None).await.unwrap().is_empty());
    }
}
