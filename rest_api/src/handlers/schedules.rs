// rest_api/src/handlers/schedules.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::Value;

use models::{DayOfWeek, DoctorSchedule, NewDoctorSchedule};
use security::access;

use crate::extract::AuthCaller;
use crate::{created, success, ApiError, AppState};

const DEFAULT_MAX_APPOINTMENTS: u32 = 10;

/// Schedules are public to authenticated users; patients consult them when
/// requesting appointments.
pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    access::can_view_doctor_directory(&caller)?;
    let schedules = state.store.list_schedules().await?;
    Ok(success("Schedules retrieved", schedules))
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub doctor_id: u32,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_appointments: Option<u32>,
    pub is_available: Option<bool>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::can_create_schedule(&caller, payload.doctor_id)?;

    if payload.end_time <= payload.start_time {
        return Err(ApiError::BadRequest("end_time must be after start_time".to_string()));
    }

    let schedule = state
        .store
        .create_schedule(NewDoctorSchedule {
            doctor_id: payload.doctor_id,
            day_of_week: payload.day_of_week,
            start_time: payload.start_time,
            end_time: payload.end_time,
            max_appointments: payload.max_appointments.unwrap_or(DEFAULT_MAX_APPOINTMENTS),
            is_available: payload.is_available.unwrap_or(true),
        })
        .await?;
    Ok(created("Schedule created", schedule))
}

async fn fetch(state: &AppState, id: u32) -> Result<DoctorSchedule, ApiError> {
    state.store.get_schedule(id).await?.ok_or_else(|| ApiError::not_found("Schedule"))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_view_doctor_directory(&caller)?;
    let schedule = fetch(&state, id).await?;
    Ok(success("Schedule retrieved", schedule))
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_appointments: Option<u32>,
    pub is_available: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut schedule = fetch(&state, id).await?;
    access::can_manage_schedule(&caller, &schedule)?;

    if let Some(start_time) = payload.start_time {
        schedule.start_time = start_time;
    }
    if let Some(end_time) = payload.end_time {
        schedule.end_time = end_time;
    }
    if schedule.end_time <= schedule.start_time {
        return Err(ApiError::BadRequest("end_time must be after start_time".to_string()));
    }
    if let Some(max_appointments) = payload.max_appointments {
        schedule.max_appointments = max_appointments;
    }
    if let Some(is_available) = payload.is_available {
        schedule.is_available = is_available;
    }

    let schedule = state.store.update_schedule(schedule).await?;
    Ok(success("Schedule updated", schedule))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let schedule = fetch(&state, id).await?;
    access::can_manage_schedule(&caller, &schedule)?;
    state.store.delete_schedule(id).await?;
    Ok(success("Schedule deleted", Value::Null))
}
