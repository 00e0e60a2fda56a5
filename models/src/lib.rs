// models/src/lib.rs
pub mod errors;
pub mod medical;

pub use errors::{collect_field_errors, FieldErrors, HmsError, HmsResult, ValidationError, ValidationResult};
pub use medical::*;
