// rest_api/src/handlers/bills.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use models::{Bill, BillStatus, NewBill};
use security::access::{self, Scope};

use crate::extract::AuthCaller;
use crate::{created, success, ApiError, AppState};

fn visible(scope: Scope, bill: &Bill) -> bool {
    match scope {
        Scope::All => true,
        Scope::PatientOnly(id) => bill.patient_id == id,
        _ => false,
    }
}

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    let scope = access::bill_scope(&caller);
    let bills: Vec<_> =
        state.store.list_bills().await?.into_iter().filter(|b| visible(scope, b)).collect();
    Ok(success("Bills retrieved", bills))
}

#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<u32>,
    pub amount: f64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(payload): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::can_create_bill(&caller)?;

    let bill = state
        .store
        .create_bill(NewBill {
            patient_id: payload.patient_id,
            appointment_id: payload.appointment_id,
            amount: payload.amount,
            description: payload.description,
            due_date: payload.due_date,
        })
        .await?;
    Ok(created("Bill created", bill))
}

async fn fetch(state: &AppState, id: u32) -> Result<Bill, ApiError> {
    state.store.get_bill(id).await?.ok_or_else(|| ApiError::not_found("Bill"))
}

pub async fn retrieve(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let bill = fetch(&state, id).await?;
    access::can_view_bill(&caller, &bill)?;
    Ok(success("Bill retrieved", bill))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBillRequest {
    pub status: Option<BillStatus>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateBillRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut bill = fetch(&state, id).await?;
    access::can_update_bill(&caller)?;

    if let Some(status) = payload.status {
        // stamp the payment time when a bill first becomes paid
        if status == BillStatus::Paid && bill.status != BillStatus::Paid {
            bill.paid_at = Some(Utc::now());
        }
        bill.status = status;
    }
    if let Some(amount) = payload.amount {
        bill.amount = amount;
    }
    if let Some(description) = payload.description {
        bill.description = description;
    }
    if payload.due_date.is_some() {
        bill.due_date = payload.due_date;
    }
    if payload.payment_method.is_some() {
        bill.payment_method = payload.payment_method;
    }

    let bill = state.store.update_bill(bill).await?;
    Ok(success("Bill updated", bill))
}

pub async fn destroy(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    access::can_delete_bill(&caller)?;
    state.store.delete_bill(id).await?;
    Ok(success("Bill deleted", Value::Null))
}
