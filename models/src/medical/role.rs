// models/src/medical/role.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// The closed set of roles an account can hold. Every request resolves to
/// exactly one of these; there is no attribute probing anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
    Receptionist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
            Role::Receptionist => "RECEPTIONIST",
        }
    }

    /// The name of the role-wide group an account may be attached to at
    /// registration time, when that group exists.
    pub fn group_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admins",
            Role::Doctor => "Doctors",
            Role::Patient => "Patients",
            Role::Receptionist => "Receptionists",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "DOCTOR" => Ok(Role::Doctor),
            "PATIENT" => Ok(Role::Patient),
            "RECEPTIONIST" => Ok(Role::Receptionist),
            other => Err(ValidationError::invalid("role", format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_roles_case_insensitively() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("RECEPTIONIST".parse::<Role>().unwrap(), Role::Receptionist);
    }

    #[test]
    fn should_reject_unknown_role() {
        assert!("nurse".parse::<Role>().is_err());
    }
}
