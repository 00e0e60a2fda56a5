// models/src/medical/gender.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Canonical gender values. Legacy single-letter codes (M/F/O) are accepted
/// on input and normalized here; only the full words are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Normalizes raw input to a canonical value. This is the single parse
    /// function every ingress boundary goes through.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Ok(Gender::Male),
            "F" | "FEMALE" => Ok(Gender::Female),
            "O" | "OTHER" => Ok(Gender::Other),
            _ => Err(ValidationError::InvalidGender(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_normalize_legacy_single_letter_codes() {
        assert_eq!(Gender::parse("M").unwrap(), Gender::Male);
        assert_eq!(Gender::parse("f").unwrap(), Gender::Female);
        assert_eq!(Gender::parse("O").unwrap(), Gender::Other);
    }

    #[test]
    fn should_accept_full_words_in_any_case() {
        assert_eq!(Gender::parse("Male").unwrap(), Gender::Male);
        assert_eq!(Gender::parse("FEMALE").unwrap(), Gender::Female);
        assert_eq!(Gender::parse("other").unwrap(), Gender::Other);
    }

    #[test]
    fn should_reject_anything_else() {
        for bad in ["X", "", "Femal", "Unknown", "MF"] {
            assert!(Gender::parse(bad).is_err(), "expected '{bad}' to be rejected");
        }
    }

    #[test]
    fn should_serialize_as_full_word() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"Female\"");
    }
}
