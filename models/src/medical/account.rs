// models/src/medical/account.rs
use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::role::Role;

/// DTO carrying new-account data as received from a registration request.
/// It holds the plaintext password only until hashing; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// The base credential + identity record shared by all roles.
/// Stores the bcrypt hash, never the plaintext password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Hashes a plaintext password.
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    /// Verifies a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str) -> Result<bool, BcryptError> {
        verify(password, &self.password_hash)
    }

    /// Creates an `Account` from a `NewAccount` DTO, hashing the password.
    pub fn from_new_account(new_account: NewAccount) -> Result<Self, BcryptError> {
        let now = Utc::now();
        let password_hash = Self::hash_password(&new_account.password)?;

        Ok(Account {
            id: Uuid::new_v4(),
            username: new_account.username,
            password_hash,
            email: new_account.email,
            first_name: new_account.first_name,
            last_name: new_account.last_name,
            role: new_account.role,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() { self.username.clone() } else { name.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account() -> NewAccount {
        NewAccount {
            username: "alicesmith".to_string(),
            password: "supersecret".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            role: Role::Patient,
        }
    }

    #[test]
    fn should_hash_password_on_creation() {
        let account = Account::from_new_account(new_account()).unwrap();
        assert_ne!(account.password_hash, "supersecret");
        assert!(account.verify_password("supersecret").unwrap());
        assert!(!account.verify_password("wrong").unwrap());
    }

    #[test]
    fn should_not_serialize_password_hash() {
        let account = Account::from_new_account(new_account()).unwrap();
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alicesmith");
    }

    #[test]
    fn should_fall_back_to_username_when_name_blank() {
        let mut input = new_account();
        input.first_name = String::new();
        input.last_name = String::new();
        let account = Account::from_new_account(input).unwrap();
        assert_eq!(account.full_name(), "alicesmith");
    }
}
