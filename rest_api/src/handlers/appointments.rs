// rest_api/src/handlers/appointments.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use models::{Appointment, AppointmentStatus, NewAppointment};
use security::access::{self, Scope};
use security::caller::Caller;

use crate::extract::AuthCaller;
use crate::{created, success, ApiError, AppState};

fn visible(scope: Scope, appointment: &Appointment) -> bool {
    match scope {
        Scope::All => true,
        Scope::PatientOnly(id) => appointment.patient_id == id,
        Scope::DoctorOnly(id) => appointment.doctor_id == id,
        Scope::Nothing => false,
    }
}

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    let scope = access::appointment_scope(&caller);
    let appointments: Vec<_> = state
        .store
        .list_appointments()
        .await?
        .into_iter()
        .filter(|a| visible(scope, a))
        .collect();
    Ok(success("Appointments retrieved", appointments))
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    /// Ignored for patient callers, who always book for themselves.
    pub patient_id: Option<Uuid>,
    pub doctor_id: u32,
    pub appointment_datetime: DateTime<Utc>,
    pub reason: Option<String>,
    /// Staff may book directly into Scheduled; patient requests are always
    /// forced to Requested.
    pub status: Option<AppointmentStatus>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let patient_id = access::can_create_appointment(&caller, payload.patient_id)?;
    let status = match caller {
        Caller::Patient { .. } => AppointmentStatus::Requested,
        _ => payload.status.unwrap_or(AppointmentStatus::Requested),
    };

    let appointment = state
        .store
        .create_appointment(NewAppointment {
            patient_id,
            doctor_id: payload.doctor_id,
            appointment_datetime: payload.appointment_datetime,
            reason: payload.reason,
            status,
        })
        .await?;
    Ok(created("Appointment created", appointment))
}

async fn fetch(state: &AppState, id: u32) -> Result<Appointment, ApiError> {
    state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let appointment = fetch(&state, id).await?;
    access::can_view_appointment(&caller, &appointment)?;
    Ok(success("Appointment retrieved", appointment))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub appointment_datetime: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut appointment = fetch(&state, id).await?;
    access::can_update_appointment(&caller, &appointment)?;

    if let Some(when) = payload.appointment_datetime {
        appointment.appointment_datetime = when;
    }
    if payload.reason.is_some() {
        appointment.reason = payload.reason;
    }
    if let Some(status) = payload.status {
        appointment
            .transition(status)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    let appointment = state.store.update_appointment(appointment).await?;
    Ok(success("Appointment updated", appointment))
}

/// Cancel action: available from any non-terminal state, rejected with a
/// client error otherwise.
pub async fn cancel(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let mut appointment = fetch(&state, id).await?;
    access::can_cancel_appointment(&caller, &appointment)?;

    if appointment.status.is_terminal() {
        return Err(ApiError::BadRequest(format!(
            "Appointment is already {} and cannot be cancelled.",
            appointment.status.as_str().to_lowercase()
        )));
    }
    appointment.cancel().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let appointment = state.store.update_appointment(appointment).await?;
    Ok(success("Appointment cancelled", appointment))
}

/// Staff may remove an appointment outright; a patient's delete is a
/// cancellation of their own appointment.
pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let appointment = fetch(&state, id).await?;
    access::can_delete_appointment(&caller, &appointment)?;

    if caller.is_staff() {
        state.store.delete_appointment(id).await?;
        Ok(success("Appointment deleted", Value::Null))
    } else {
        cancel(State(state), AuthCaller(caller), Path(id)).await
    }
}
