// rest_api/src/lib.rs
//
// HTTP surface of the HMS backend. All responses share one envelope:
// `{"status": "success"|"error", "message": ..., "data"|"errors": ...}`.
// `ApiError` is the single place typed failures from the lower layers are
// converted into that envelope; handlers never build error responses by
// hand.

pub mod config;
pub mod extract;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use models::{FieldErrors, HmsError};
use security::access::AccessError;
use security::registration::RegistrationError;
use security::AuthError;
use storage::HmsStore;

use crate::config::RestApiConfig;

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid data provided")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

impl From<HmsError> for ApiError {
    fn from(err: HmsError) -> Self {
        match err {
            HmsError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            HmsError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            HmsError::Validation(v) => {
                ApiError::Validation(models::collect_field_errors(vec![v]))
            }
            HmsError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            HmsError::Auth(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden => ApiError::Forbidden(err.to_string()),
            // missing profile on a create path is a client-side data problem
            AccessError::ProfileMissing(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(fields) => ApiError::Validation(fields),
            RegistrationError::UsernameTaken => ApiError::Conflict(err.to_string()),
            RegistrationError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

// Convert ApiError into the error envelope; this is the only place HTTP
// error responses are produced.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "status": "error",
                    "message": "Invalid data provided",
                    "errors": fields,
                }),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "status": "error", "message": msg }))
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "status": "error", "message": msg }))
            }
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, json!({ "status": "error", "message": msg }))
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, json!({ "status": "error", "message": msg }))
            }
            ApiError::Conflict(msg) => {
                (StatusCode::CONFLICT, json!({ "status": "error", "message": msg }))
            }
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                // generic message to the client, detail kept to a string
                json!({
                    "status": "error",
                    "message": "An unexpected server error occurred",
                    "detail": detail,
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// 200 envelope with a message and data payload.
pub fn success(message: impl Into<String>, data: impl Serialize) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message.into(),
        "data": data,
    }))
}

/// 201 envelope for newly created resources.
pub fn created(message: impl Into<String>, data: impl Serialize) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, success(message, data))
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HmsStore>,
    pub config: Arc<RestApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn HmsStore>, config: RestApiConfig) -> Self {
        AppState { store, config: Arc::new(config) }
    }
}

// Handler for the /api/v1/health endpoint
async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "HMS REST API is healthy" })))
}

// Handler for the /api/v1/version endpoint
async fn version_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })))
}

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    use crate::handlers::*;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_origin(Any);

    Router::new()
        .route("/api/v1/health", get(health_check_handler))
        .route("/api/v1/version", get(version_handler))
        // authentication
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/user", get(auth::current_user))
        // registration (admin-authenticated and unauthenticated variants)
        .route("/api/v1/register/patient", post(registration::register_patient_admin))
        .route("/api/v1/register/doctor", post(registration::register_doctor_admin))
        .route("/api/v1/register/receptionist", post(registration::register_receptionist_admin))
        .route("/api/v1/register/patient/no-csrf", post(registration::register_patient_no_csrf))
        .route("/api/v1/register/doctor/no-csrf", post(registration::register_doctor_no_csrf))
        .route(
            "/api/v1/register/receptionist/no-csrf",
            post(registration::register_receptionist_no_csrf),
        )
        // patients
        .route("/api/v1/patients", get(patients::list))
        .route(
            "/api/v1/patients/:id",
            get(patients::retrieve).put(patients::update).delete(patients::destroy),
        )
        // doctors
        .route("/api/v1/doctors", get(doctors::list))
        .route(
            "/api/v1/doctors/:id",
            get(doctors::retrieve).put(doctors::update).delete(doctors::destroy),
        )
        // appointments
        .route("/api/v1/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/api/v1/appointments/:id",
            get(appointments::retrieve)
                .put(appointments::update)
                .delete(appointments::destroy),
        )
        .route("/api/v1/appointments/:id/cancel", patch(appointments::cancel))
        // medical records
        .route(
            "/api/v1/medical-records",
            get(medical_records::list).post(medical_records::create),
        )
        .route(
            "/api/v1/medical-records/:id",
            get(medical_records::retrieve)
                .put(medical_records::update)
                .delete(medical_records::destroy),
        )
        // lab tests
        .route("/api/v1/lab-tests", get(lab_tests::list).post(lab_tests::create))
        .route(
            "/api/v1/lab-tests/:id",
            get(lab_tests::retrieve).put(lab_tests::update).delete(lab_tests::destroy),
        )
        // bills
        .route("/api/v1/bills", get(bills::list).post(bills::create))
        .route(
            "/api/v1/bills/:id",
            get(bills::retrieve).put(bills::update).delete(bills::destroy),
        )
        // receptionists
        .route("/api/v1/receptionists", get(receptionists::list))
        .route(
            "/api/v1/receptionists/:id",
            get(receptionists::retrieve)
                .put(receptionists::update)
                .delete(receptionists::destroy),
        )
        // doctor schedules
        .route("/api/v1/schedules", get(schedules::list).post(schedules::create))
        .route(
            "/api/v1/schedules/:id",
            get(schedules::retrieve).put(schedules::update).delete(schedules::destroy),
        )
        // admin reports
        .route("/api/v1/admin/statistics", get(admin::statistics))
        .route("/api/v1/admin/logs", get(admin::logs))
        .with_state(state)
        .layer(cors)
}

/// Starts the REST API server; runs until the shutdown signal fires.
pub async fn start_server(
    state: AppState,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), anyhow::Error> {
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .context("Invalid host/port configuration")?;

    let app = app_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {addr}"))?;
    info!("HMS REST API server listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal.");
        })
        .await
        .context("REST API server failed to start or run")?;

    info!("HMS REST API server stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400_with_field_map() {
        let mut fields = FieldErrors::new();
        fields.insert("gender".to_string(), vec!["bad".to_string()]);
        let resp = ApiError::Validation(fields).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_is_distinct_from_validation() {
        let resp = ApiError::Conflict("This username is already taken.".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_behind_generic_message() {
        let resp = ApiError::Internal("stack trace goes here".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn layer_errors_convert_to_expected_statuses() {
        let forbidden: ApiError = AccessError::Forbidden.into();
        assert!(matches!(forbidden, ApiError::Forbidden(_)));

        let missing: ApiError = AccessError::ProfileMissing("Patient").into();
        assert!(matches!(missing, ApiError::BadRequest(_)));

        let taken: ApiError = RegistrationError::UsernameTaken.into();
        assert!(matches!(taken, ApiError::Conflict(_)));

        let bad_creds: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(bad_creds, ApiError::Unauthorized(_)));
    }
}
