// rest_api/src/extract.rs

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use security::caller::Caller;
use security::validate_token;

use crate::{ApiError, AppState};

/// Extractor for authenticated requests: validates the bearer token and
/// resolves the caller's capability context once, before the handler runs.
/// Unauthenticated access is always denied here.
pub struct AuthCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Missing or invalid token".to_string()))?;

        let claims = validate_token(state.config.jwt_secret.as_bytes(), token)?;

        let caller = Caller::resolve(state.store.as_ref(), &claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(AuthCaller(caller))
    }
}
