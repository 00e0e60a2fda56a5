// rest_api/src/handlers/medical_records.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use models::{MedicalRecord, NewMedicalRecord};
use security::access::{self, Scope};

use crate::extract::AuthCaller;
use crate::{created, success, ApiError, AppState};

fn visible(scope: Scope, record: &MedicalRecord) -> bool {
    match scope {
        Scope::All => true,
        Scope::PatientOnly(id) => record.patient_id == id,
        Scope::DoctorOnly(id) => record.doctor_id == Some(id),
        Scope::Nothing => false,
    }
}

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    let scope = access::medical_record_scope(&caller);
    let records: Vec<_> = state
        .store
        .list_medical_records()
        .await?
        .into_iter()
        .filter(|r| visible(scope, r))
        .collect();
    Ok(success("Medical records retrieved", records))
}

#[derive(Debug, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub patient_id: Uuid,
    /// Honored for admin callers only; doctors are stamped with themselves.
    pub doctor_id: Option<u32>,
    pub record_type: String,
    pub description: String,
    pub document: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let doctor_id = access::can_create_medical_record(&caller, payload.doctor_id)?;

    let record = state
        .store
        .create_medical_record(NewMedicalRecord {
            patient_id: payload.patient_id,
            doctor_id,
            record_type: payload.record_type,
            description: payload.description,
            document: payload.document,
        })
        .await?;
    Ok(created("Medical record created", record))
}

async fn fetch(state: &AppState, id: u32) -> Result<MedicalRecord, ApiError> {
    state
        .store
        .get_medical_record(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Medical record"))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let record = fetch(&state, id).await?;
    access::can_view_medical_record(&caller, &record)?;
    Ok(success("Medical record retrieved", record))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMedicalRecordRequest {
    pub record_type: Option<String>,
    pub description: Option<String>,
    pub document: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut record = fetch(&state, id).await?;
    access::can_update_medical_record(&caller, &record)?;

    if let Some(record_type) = payload.record_type {
        record.record_type = record_type;
    }
    if let Some(description) = payload.description {
        record.description = description;
    }
    if payload.document.is_some() {
        record.document = payload.document;
    }

    let record = state.store.update_medical_record(record).await?;
    Ok(success("Medical record updated", record))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_delete_medical_record(&caller)?;
    state.store.delete_medical_record(id).await?;
    Ok(success("Medical record deleted", Value::Null))
}
