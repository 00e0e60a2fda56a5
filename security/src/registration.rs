// security/src/registration.rs
//
// The multi-record registration workflow. Each role flow validates its
// input, creates the account plus role profile, then performs the flow's
// secondary write. The patient flow mirrors the profile into the legacy
// registry best-effort; the unauthenticated receptionist flow compensates
// by deleting the account when its profile write fails. Both policies are
// named at the call site so neither is implicit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use models::{
    collect_field_errors, Account, DoctorProfile, FieldErrors, Gender, HmsError,
    LegacyPatientRecord, NewAccount, NewDoctorProfile, NewLegacyPatientRecord,
    NewReceptionistProfile, PatientProfile, ReceptionistProfile, Role, ValidationError,
};
use storage::HmsStore;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What to do when a flow's secondary write fails after the account (and
/// profile) already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyWritePolicy {
    /// Log the failure with the attempted field values and report the
    /// registration as successful anyway.
    BestEffort,
    /// Delete the account created earlier and fail the registration.
    RollbackAccount,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Invalid data provided")]
    Validation(FieldErrors),
    #[error("This username is already taken.")]
    UsernameTaken,
    #[error("Registration failed: {0}")]
    Internal(String),
}

impl RegistrationError {
    fn internal(err: impl ToString) -> Self {
        RegistrationError::Internal(err.to_string())
    }
}

/// Maps a storage error from the account-creation step. A constraint
/// violation here means a concurrent registration won the username race.
fn map_create_error(err: HmsError) -> RegistrationError {
    match err {
        HmsError::Conflict { .. } => RegistrationError::UsernameTaken,
        other => RegistrationError::internal(other),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientRegistration {
    pub username: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    /// Registry number for the legacy mirror record; defaults to the
    /// username when absent.
    pub reg_num: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRegistration {
    pub username: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub department: String,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceptionistRegistration {
    pub username: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredPatient {
    pub account: Account,
    pub profile: PatientProfile,
    pub legacy_record: Option<LegacyPatientRecord>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredDoctor {
    pub account: Account,
    pub profile: DoctorProfile,
}

#[derive(Debug, Serialize)]
pub struct RegisteredReceptionist {
    pub account: Account,
    pub profile: ReceptionistProfile,
}

fn require(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::MissingField(field.to_string()));
    }
}

fn check_common(
    username: &str,
    password: &str,
    confirm_password: Option<&str>,
    email: Option<&str>,
    first_name: &str,
    last_name: &str,
    errors: &mut Vec<ValidationError>,
) {
    require("username", username, errors);
    require("password", password, errors);
    require("first_name", first_name, errors);
    require("last_name", last_name, errors);
    if let Some(confirm) = confirm_password {
        if confirm != password {
            errors.push(ValidationError::PasswordMismatch);
        }
    }
    if let Some(email) = email {
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            errors.push(ValidationError::invalid("email", "not a valid email address"));
        }
    }
}

fn parse_date(raw: &str) -> Result<chrono::NaiveDate, ValidationError> {
    chrono::NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDateFormat(raw.to_string()))
}

fn fail_on_errors(errors: Vec<ValidationError>) -> Result<(), RegistrationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegistrationError::Validation(collect_field_errors(errors)))
    }
}

/// Fail-fast username pre-check. The storage constraint remains the real
/// guarantee; this just gives a clean error before any write.
async fn check_username_free(
    store: &dyn HmsStore,
    username: &str,
) -> Result<(), RegistrationError> {
    let existing = store
        .get_account_by_username(username)
        .await
        .map_err(RegistrationError::internal)?;
    if existing.is_some() {
        return Err(RegistrationError::UsernameTaken);
    }
    Ok(())
}

async fn attach_to_role_group(store: &dyn HmsStore, account: &Account) {
    // group may legitimately not exist; only a storage failure is worth noise
    match store.add_account_to_group(account.id, account.role.group_name()).await {
        Ok(_) => {}
        Err(e) => warn!(username = %account.username, error = %e, "failed to attach account to role group"),
    }
}

/// Registers a patient: account + profile atomically, then the legacy
/// mirror record under the given policy, then best-effort group attach.
pub async fn register_patient(
    store: &dyn HmsStore,
    input: PatientRegistration,
    created_by: Option<Uuid>,
    policy: LegacyWritePolicy,
) -> Result<RegisteredPatient, RegistrationError> {
    let mut errors = Vec::new();
    check_common(
        &input.username,
        &input.password,
        input.confirm_password.as_deref(),
        input.email.as_deref(),
        &input.first_name,
        &input.last_name,
        &mut errors,
    );
    let gender = match Gender::parse(&input.gender) {
        Ok(g) => Some(g),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let date_of_birth = match parse_date(&input.date_of_birth) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    fail_on_errors(errors)?;
    let (gender, date_of_birth) = (gender.unwrap(), date_of_birth.unwrap());

    check_username_free(store, &input.username).await?;

    let account = Account::from_new_account(NewAccount {
        username: input.username.clone(),
        password: input.password.clone(),
        email: input.email.clone().unwrap_or_default(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        role: Role::Patient,
    })
    .map_err(|e| RegistrationError::internal(format!("Failed to hash password: {e}")))?;

    let profile = PatientProfile::new(
        account.id,
        date_of_birth,
        gender,
        input.contact_number.clone(),
        input.address.clone(),
        created_by,
    );

    let (account, profile) = store
        .create_account_with_patient(account, profile)
        .await
        .map_err(map_create_error)?;

    let reg_num = input.reg_num.unwrap_or_else(|| input.username.clone());
    let legacy = NewLegacyPatientRecord {
        reg_num,
        first_name: input.first_name,
        last_name: input.last_name,
        gender,
        date_of_birth,
        contact_number: input.contact_number,
        email: input.email,
    };
    let legacy_record = match store.create_legacy_patient(legacy.clone()).await {
        Ok(record) => Some(record),
        Err(e) => match policy {
            LegacyWritePolicy::BestEffort => {
                error!(
                    error = %e,
                    reg_num = %legacy.reg_num,
                    first_name = %legacy.first_name,
                    last_name = %legacy.last_name,
                    gender = %legacy.gender,
                    date_of_birth = %legacy.date_of_birth,
                    "failed to create legacy patient record; registration kept"
                );
                None
            }
            LegacyWritePolicy::RollbackAccount => {
                if let Err(del) = store.delete_account(account.id).await {
                    error!(error = %del, "rollback of account after legacy write failure also failed");
                }
                return Err(RegistrationError::internal(format!(
                    "Failed to create legacy patient record: {e}"
                )));
            }
        },
    };

    attach_to_role_group(store, &account).await;

    Ok(RegisteredPatient { account, profile, legacy_record })
}

/// Registers a doctor: account + profile in one atomic step. Name fields on
/// the profile are denormalized from the account.
pub async fn register_doctor(
    store: &dyn HmsStore,
    input: DoctorRegistration,
) -> Result<RegisteredDoctor, RegistrationError> {
    let mut errors = Vec::new();
    check_common(
        &input.username,
        &input.password,
        input.confirm_password.as_deref(),
        input.email.as_deref(),
        &input.first_name,
        &input.last_name,
        &mut errors,
    );
    require("specialization", &input.specialization, &mut errors);
    require("department", &input.department, &mut errors);
    fail_on_errors(errors)?;

    check_username_free(store, &input.username).await?;

    let account = Account::from_new_account(NewAccount {
        username: input.username,
        password: input.password,
        email: input.email.clone().unwrap_or_default(),
        first_name: input.first_name,
        last_name: input.last_name,
        role: Role::Doctor,
    })
    .map_err(|e| RegistrationError::internal(format!("Failed to hash password: {e}")))?;

    let profile = NewDoctorProfile {
        account_id: account.id,
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        specialization: input.specialization,
        department: input.department,
        contact_number: input.contact_number,
        email: input.email,
    };

    let (account, profile) = store
        .create_account_with_doctor(account, profile)
        .await
        .map_err(map_create_error)?;

    attach_to_role_group(store, &account).await;

    Ok(RegisteredDoctor { account, profile })
}

fn check_receptionist(
    input: &ReceptionistRegistration,
) -> Result<Option<chrono::NaiveDate>, RegistrationError> {
    let mut errors = Vec::new();
    check_common(
        &input.username,
        &input.password,
        input.confirm_password.as_deref(),
        input.email.as_deref(),
        &input.first_name,
        &input.last_name,
        &mut errors,
    );
    let date_of_birth = match input.date_of_birth.as_deref() {
        Some(raw) => match parse_date(raw) {
            Ok(d) => Some(d),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => None,
    };
    fail_on_errors(errors)?;
    Ok(date_of_birth)
}

fn receptionist_account(
    input: &ReceptionistRegistration,
) -> Result<Account, RegistrationError> {
    Account::from_new_account(NewAccount {
        username: input.username.clone(),
        password: input.password.clone(),
        email: input.email.clone().unwrap_or_default(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        role: Role::Receptionist,
    })
    .map_err(|e| RegistrationError::internal(format!("Failed to hash password: {e}")))
}

/// Admin-driven receptionist registration: account + profile in one atomic
/// step.
pub async fn register_receptionist(
    store: &dyn HmsStore,
    input: ReceptionistRegistration,
) -> Result<RegisteredReceptionist, RegistrationError> {
    let date_of_birth = check_receptionist(&input)?;
    check_username_free(store, &input.username).await?;
    let account = receptionist_account(&input)?;

    let profile = NewReceptionistProfile {
        account_id: account.id,
        contact_number: input.contact_number,
        address: input.address,
        date_of_birth,
    };
    let (account, profile) = store
        .create_account_with_receptionist(account, profile)
        .await
        .map_err(map_create_error)?;

    attach_to_role_group(store, &account).await;

    Ok(RegisteredReceptionist { account, profile })
}

/// Unauthenticated ("no-CSRF") receptionist registration. Unlike the
/// patient flow, a failed profile write rolls the account back; the caller
/// must never be left with an orphaned credential it cannot use.
pub async fn register_receptionist_no_csrf(
    store: &dyn HmsStore,
    input: ReceptionistRegistration,
) -> Result<RegisteredReceptionist, RegistrationError> {
    let date_of_birth = check_receptionist(&input)?;
    check_username_free(store, &input.username).await?;
    let account = receptionist_account(&input)?;

    let account = store.create_account(account).await.map_err(map_create_error)?;

    let profile = NewReceptionistProfile {
        account_id: account.id,
        contact_number: input.contact_number,
        address: input.address,
        date_of_birth,
    };
    let profile = match store.create_receptionist(profile).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(
                username = %account.username,
                error = %e,
                "failed to create receptionist record; rolling back account"
            );
            if let Err(del) = store.delete_account(account.id).await {
                error!(error = %del, "rollback of account also failed");
            }
            return Err(RegistrationError::internal(format!(
                "Failed to create receptionist record: {e}"
            )));
        }
    };

    attach_to_role_group(store, &account).await;

    Ok(RegisteredReceptionist { account, profile })
}
