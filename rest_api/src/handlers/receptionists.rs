// rest_api/src/handlers/receptionists.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use models::ReceptionistProfile;
use security::access;

use crate::extract::AuthCaller;
use crate::{success, ApiError, AppState};

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    access::can_list_receptionists(&caller)?;
    let receptionists = state.store.list_receptionists().await?;
    Ok(success("Receptionists retrieved", receptionists))
}

async fn fetch(state: &AppState, id: u32) -> Result<ReceptionistProfile, ApiError> {
    state
        .store
        .get_receptionist(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Receptionist"))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let receptionist = fetch(&state, id).await?;
    access::can_view_receptionist(&caller, receptionist.account_id)?;
    Ok(success("Receptionist retrieved", receptionist))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReceptionistRequest {
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateReceptionistRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut receptionist = fetch(&state, id).await?;
    access::can_update_receptionist(&caller, receptionist.account_id)?;

    if payload.contact_number.is_some() {
        receptionist.contact_number = payload.contact_number;
    }
    if payload.address.is_some() {
        receptionist.address = payload.address;
    }
    if let Some(is_active) = payload.is_active {
        receptionist.is_active = is_active;
    }

    let receptionist = state.store.update_receptionist(receptionist).await?;
    Ok(success("Receptionist updated", receptionist))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_delete_receptionist(&caller)?;
    state.store.delete_receptionist(id).await?;
    Ok(success("Receptionist deleted", Value::Null))
}
