// rest_api/src/handlers/patients.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::{Account, Gender, PatientProfile};
use security::access::{self, Scope};

use crate::extract::AuthCaller;
use crate::{success, ApiError, AppState};

/// Combined account + profile view, the shape clients expect for patients.
fn patient_payload(account: Option<&Account>, profile: &PatientProfile) -> Value {
    json!({
        "id": profile.account_id,
        "username": account.map(|a| a.username.clone()),
        "email": account.map(|a| a.email.clone()),
        "first_name": account.map(|a| a.first_name.clone()),
        "last_name": account.map(|a| a.last_name.clone()),
        "date_of_birth": profile.date_of_birth,
        "gender": profile.gender,
        "contact_number": profile.contact_number,
        "address": profile.address,
        "created_at": profile.created_at,
        "updated_at": profile.updated_at,
    })
}

async fn enriched(state: &AppState, profile: &PatientProfile) -> Result<Value, ApiError> {
    let account = state.store.get_account(profile.account_id).await?;
    Ok(patient_payload(account.as_ref(), profile))
}

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    let profiles = match access::patient_profile_scope(&caller) {
        Scope::All => state.store.list_patient_profiles().await?,
        Scope::PatientOnly(id) => {
            state.store.get_patient_profile(id).await?.into_iter().collect()
        }
        _ => Vec::new(),
    };

    let mut payload = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        payload.push(enriched(&state, profile).await?);
    }
    Ok(success("Patients retrieved", payload))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let profile = state
        .store
        .get_patient_profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    access::can_view_patient_profile(&caller, &profile)?;
    Ok(success("Patient retrieved", enriched(&state, &profile).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut profile = state
        .store
        .get_patient_profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    access::can_update_patient_profile(&caller, &profile)?;

    if let Some(raw) = payload.gender.as_deref() {
        profile.gender = Gender::parse(raw).map_err(models::HmsError::from)?;
    }
    if let Some(raw) = payload.date_of_birth.as_deref() {
        profile.date_of_birth = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("invalid date format: {raw}")))?;
    }
    if payload.contact_number.is_some() {
        profile.contact_number = payload.contact_number;
    }
    if payload.address.is_some() {
        profile.address = payload.address;
    }

    let profile = state.store.update_patient_profile(profile).await?;
    Ok(success("Patient updated", enriched(&state, &profile).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    access::can_delete_patient_profile(&caller)?;
    state.store.delete_patient_profile(id).await?;
    Ok(success("Patient deleted", Value::Null))
}
