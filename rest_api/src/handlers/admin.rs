// rest_api/src/handlers/admin.rs
//
// Admin dashboard surfaces: aggregate statistics over the whole store and
// the stored system log entries.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use models::LogLevel;
use security::access;

use crate::extract::AuthCaller;
use crate::{success, ApiError, AppState};

fn distribution<T, K>(items: &[T], key: impl Fn(&T) -> K) -> BTreeMap<K, usize>
where
    K: Ord,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

pub async fn statistics(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Json<Value>, ApiError> {
    access::can_view_admin_reports(&caller)?;

    let patients = state.store.list_patient_profiles().await?;
    let doctors = state.store.list_doctors().await?;
    let appointments = state.store.list_appointments().await?;
    let lab_orders = state.store.list_lab_orders().await?;
    let bills = state.store.list_bills().await?;

    let appointment_status = distribution(&appointments, |a| a.status.as_str().to_string());
    let lab_test_status = distribution(&lab_orders, |o| o.status.as_str().to_string());
    let gender_distribution = distribution(&patients, |p| p.gender.as_str().to_string());
    let departments = distribution(&doctors, |d| d.department.clone());

    Ok(success(
        "System statistics",
        json!({
            "total_doctors": doctors.len(),
            "total_patients": patients.len(),
            "total_appointments": appointments.len(),
            "total_lab_tests": lab_orders.len(),
            "total_bills": bills.len(),
            "appointments": { "status_distribution": appointment_status },
            "lab_tests": { "status_distribution": lab_test_status },
            "patient_gender_distribution": gender_distribution,
            "departments": departments,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// `info`, `warning`, `error` or `all` (default).
    pub level: Option<String>,
}

pub async fn logs(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, ApiError> {
    access::can_view_admin_reports(&caller)?;

    let level = match query.level.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            LogLevel::from_str(raw)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };

    let logs = state.store.list_logs(level).await?;
    Ok(success("System logs", logs))
}
