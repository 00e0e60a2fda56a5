// rest_api/src/handlers/doctors.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use security::access;

use crate::extract::AuthCaller;
use crate::{success, ApiError, AppState};

/// The doctor directory is visible to any authenticated user so patients
/// can pick a doctor when requesting appointments.
pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    access::can_view_doctor_directory(&caller)?;
    let doctors = state.store.list_doctors().await?;
    Ok(success("Doctors retrieved", doctors))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_view_doctor_directory(&caller)?;
    let doctor =
        state.store.get_doctor(id).await?.ok_or_else(|| ApiError::not_found("Doctor"))?;
    Ok(success("Doctor retrieved", doctor))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDoctorRequest {
    pub specialization: Option<String>,
    pub department: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut doctor =
        state.store.get_doctor(id).await?.ok_or_else(|| ApiError::not_found("Doctor"))?;
    access::can_manage_doctor(&caller, doctor.account_id)?;

    if let Some(specialization) = payload.specialization {
        doctor.specialization = specialization;
    }
    if let Some(department) = payload.department {
        doctor.department = department;
    }
    if payload.contact_number.is_some() {
        doctor.contact_number = payload.contact_number;
    }
    if payload.email.is_some() {
        doctor.email = payload.email;
    }

    let doctor = state.store.update_doctor(doctor).await?;
    Ok(success("Doctor updated", doctor))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_delete_doctor(&caller)?;
    state.store.delete_doctor(id).await?;
    Ok(success("Doctor deleted", Value::Null))
}
