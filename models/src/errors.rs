// models/src/errors.rs

use std::collections::BTreeMap;

pub use thiserror::Error;

/// Field name -> list of messages, the shape validation failures are
/// reported in at the API boundary.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum HmsError {
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Failed to acquire lock: {0}")]
    LockError(String),
    #[error("{entity} already exists: {detail}")]
    Conflict { entity: &'static str, detail: String },
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An internal error occurred: {0}")]
    InternalError(String),
}

impl HmsError {
    pub fn conflict(entity: &'static str, detail: impl Into<String>) -> Self {
        HmsError::Conflict { entity, detail: detail.into() }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        HmsError::NotFound { entity, id: id.to_string() }
    }
}

/// A validation error raised before any write happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or absent.
    #[error("field '{0}' is required")]
    MissingField(String),
    /// A field value did not match the expected format.
    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    /// A gender value outside the canonical set and its legacy codes.
    #[error("gender '{0}' is not one of Male, Female, Other (or M, F, O)")]
    InvalidGender(String),
    /// An invalid date string was provided.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    /// The password and its confirmation did not match.
    #[error("passwords don't match")]
    PasswordMismatch,
    /// A status transition that the state machine forbids.
    #[error("cannot transition from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField { field: field.into(), reason: reason.into() }
    }

    /// The field name this error should be reported under in a `FieldErrors`
    /// map. Non-field errors land under "non_field_errors".
    pub fn field_name(&self) -> &str {
        match self {
            ValidationError::MissingField(f) | ValidationError::InvalidField { field: f, .. } => f,
            ValidationError::InvalidGender(_) => "gender",
            ValidationError::InvalidDateFormat(_) => "date_of_birth",
            ValidationError::PasswordMismatch => "confirm_password",
            _ => "non_field_errors",
        }
    }
}

/// A type alias for a `Result` that returns an `HmsError` on failure.
pub type HmsResult<T> = Result<T, HmsError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collects validation errors into the field map the API reports.
pub fn collect_field_errors(errors: Vec<ValidationError>) -> FieldErrors {
    let mut map = FieldErrors::new();
    for err in errors {
        let field = err.field_name().to_string();
        map.entry(field).or_default().push(err.to_string());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collect_errors_per_field() {
        let errors = vec![
            ValidationError::MissingField("username".to_string()),
            ValidationError::invalid("email", "not a valid email address"),
            ValidationError::InvalidGender("X".to_string()),
        ];
        let map = collect_field_errors(errors);
        assert_eq!(map.len(), 3);
        assert!(map["username"][0].contains("required"));
        assert!(map["gender"][0].contains("not one of"));
    }

    #[test]
    fn should_route_password_mismatch_to_confirm_field() {
        let map = collect_field_errors(vec![ValidationError::PasswordMismatch]);
        assert!(map.contains_key("confirm_password"));
    }
}
