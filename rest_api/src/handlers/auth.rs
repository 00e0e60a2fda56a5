// rest_api/src/handlers/auth.rs

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use security::caller::Caller;
use security::{authenticate, generate_token, LoginRequest};

use crate::extract::AuthCaller;
use crate::{success, ApiError, AppState};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let account = authenticate(state.store.as_ref(), &payload).await?;
    let token = generate_token(state.config.jwt_secret.as_bytes(), &account)?;

    Ok(success(
        "Login successful",
        json!({
            "token": token,
            "user_id": account.id,
            "username": account.username,
            "role": account.role,
        }),
    ))
}

/// Token-based sessions have no server-side state to tear down; the client
/// drops the token.
pub async fn logout() -> Json<Value> {
    success("Logged out successfully", Value::Null)
}

pub async fn current_user(AuthCaller(caller): AuthCaller) -> Json<Value> {
    let account = caller.account();
    let profile = match &caller {
        Caller::Admin { .. } => Value::Null,
        Caller::Doctor { profile, .. } => json!(profile),
        Caller::Patient { profile, .. } => json!(profile),
        Caller::Receptionist { profile, .. } => json!(profile),
    };

    success(
        "Current user",
        json!({
            "id": account.id,
            "username": account.username,
            "email": account.email,
            "first_name": account.first_name,
            "last_name": account.last_name,
            "role": account.role,
            "profile": profile,
        }),
    )
}
