// rest_api/src/handlers/registration.rs
//
// Registration endpoints. The admin-authenticated variants resolve the
// caller first; the "no-CSRF" variants are open and exist for bootstrap
// and kiosk-style self-registration. Either way the actual workflow lives
// in security::registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use security::access;
use security::registration::{
    self as flow, DoctorRegistration, LegacyWritePolicy, PatientRegistration,
    ReceptionistRegistration,
};

use crate::extract::AuthCaller;
use crate::{created, ApiError, AppState};

pub async fn register_patient_admin(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<PatientRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::can_register_patient(&caller)?;
    let registered = flow::register_patient(
        state.store.as_ref(),
        payload,
        Some(caller.account().id),
        LegacyWritePolicy::BestEffort,
    )
    .await?;
    Ok(created(
        format!("Patient registered successfully with username: {}", registered.account.username),
        &registered,
    ))
}

pub async fn register_patient_no_csrf(
    State(state): State<AppState>,
    Json(payload): Json<PatientRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registered =
        flow::register_patient(state.store.as_ref(), payload, None, LegacyWritePolicy::BestEffort)
            .await?;
    Ok(created(
        format!("Patient registered successfully with username: {}", registered.account.username),
        &registered,
    ))
}

pub async fn register_doctor_admin(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<DoctorRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::can_register_role(&caller)?;
    let registered = flow::register_doctor(state.store.as_ref(), payload).await?;
    Ok(created(
        format!("Doctor registered successfully with username: {}", registered.account.username),
        &registered,
    ))
}

pub async fn register_doctor_no_csrf(
    State(state): State<AppState>,
    Json(payload): Json<DoctorRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registered = flow::register_doctor(state.store.as_ref(), payload).await?;
    Ok(created(
        format!("Doctor registered successfully with username: {}", registered.account.username),
        &registered,
    ))
}

pub async fn register_receptionist_admin(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<ReceptionistRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::can_register_role(&caller)?;
    let registered = flow::register_receptionist(state.store.as_ref(), payload).await?;
    Ok(created(
        format!(
            "Receptionist registered successfully with username: {}",
            registered.account.username
        ),
        &registered,
    ))
}

pub async fn register_receptionist_no_csrf(
    State(state): State<AppState>,
    Json(payload): Json<ReceptionistRegistration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registered = flow::register_receptionist_no_csrf(state.store.as_ref(), payload).await?;
    Ok(created(
        format!(
            "Receptionist registered successfully with username: {}",
            registered.account.username
        ),
        &registered,
    ))
}
