// security/src/lib.rs
//
// Authentication and authorization for the HMS backend: password checks and
// JWT issue/validate here, per-request caller resolution in `caller`, the
// role/ownership access table in `access`, and the multi-record registration
// workflow in `registration`.

pub mod access;
pub mod caller;
pub mod registration;

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use models::{Account, Role};
use storage::HmsStore;

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: u64 = 60 * 60 * 24;

/// Login data transfer object (DTO).
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Claims for JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    pub role: Role,
    pub exp: u64,
    pub iat: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing or invalid token")]
    InvalidToken,
    #[error("JWT error: {0}")]
    Jwt(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Generates a JWT for an authenticated account.
pub fn generate_token(secret: &[u8], account: &Account) -> Result<String, AuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::Jwt(format!("System time error: {e}")))?
        .as_secs();

    let claims = Claims {
        sub: account.username.clone(),
        role: account.role,
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Jwt(format!("Failed to encode JWT: {e}")))
}

/// Decodes and validates a JWT.
pub fn validate_token(secret: &[u8], token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Verifies credentials against the store. Returns the account on success
/// and records the login time.
pub async fn authenticate(
    store: &dyn HmsStore,
    login: &LoginRequest,
) -> Result<Account, AuthError> {
    let account = store
        .get_account_by_username(&login.username)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;

    let ok = account
        .verify_password(&login.password)
        .map_err(|e| AuthError::Internal(format!("Password verification failed: {e}")))?;
    if !ok {
        return Err(AuthError::InvalidCredentials);
    }

    store
        .touch_last_login(account.id)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::NewAccount;
    use storage::MemoryStore;

    const SECRET: &[u8] = b"test-secret-key-that-is-long-enough";

    fn account() -> Account {
        Account::from_new_account(NewAccount {
            username: "alicesmith".to_string(),
            password: "supersecret".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            role: Role::Patient,
        })
        .unwrap()
    }

    #[test]
    fn should_round_trip_claims() {
        let token = generate_token(SECRET, &account()).unwrap();
        let claims = validate_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "alicesmith");
        assert_eq!(claims.role, Role::Patient);
    }

    #[test]
    fn should_reject_token_signed_with_other_secret() {
        let token = generate_token(b"another-secret-entirely-goes-here", &account()).unwrap();
        assert!(matches!(validate_token(SECRET, &token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn should_authenticate_valid_credentials_and_touch_last_login() {
        let store = MemoryStore::new();
        let acct = store.create_account(account()).await.unwrap();
        assert!(acct.last_login.is_none());

        let login = LoginRequest {
            username: "alicesmith".to_string(),
            password: "supersecret".to_string(),
        };
        let authed = authenticate(&store, &login).await.unwrap();
        assert_eq!(authed.id, acct.id);

        let refreshed = store.get_account(acct.id).await.unwrap().unwrap();
        assert!(refreshed.last_login.is_some());
    }

    #[tokio::test]
    async fn should_reject_wrong_password_and_unknown_user_alike() {
        let store = MemoryStore::new();
        store.create_account(account()).await.unwrap();

        let wrong = LoginRequest {
            username: "alicesmith".to_string(),
            password: "nope".to_string(),
        };
        assert!(matches!(authenticate(&store, &wrong).await, Err(AuthError::InvalidCredentials)));

        let unknown = LoginRequest {
            username: "ghost".to_string(),
            password: "supersecret".to_string(),
        };
        assert!(matches!(authenticate(&store, &unknown).await, Err(AuthError::InvalidCredentials)));
    }
}
