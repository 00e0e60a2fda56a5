// security/src/access.rs
//
// The role/ownership access table. Every handler asks this module before
// touching a record: list actions get a `Scope` that narrows the visible
// set, everything else gets Ok or a typed denial. Rules, per role:
//
//   Admin         full access everywhere.
//   Receptionist  all appointments and bills; patient profiles they
//                 created; no lab orders or medical records; may create
//                 patient profiles, appointments and bills; may delete
//                 bills only.
//   Doctor        records where the doctor is themselves; may create
//                 medical records and lab orders (stamped with self).
//   Patient       records where the patient is themselves; may request
//                 appointments for themselves and cancel their own.

use thiserror::Error;
use uuid::Uuid;

use models::{Appointment, Bill, DoctorSchedule, LabTestOrder, MedicalRecord, PatientProfile};

use crate::caller::Caller;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Role/ownership mismatch. Reveals nothing about the record.
    #[error("You do not have permission to perform this action")]
    Forbidden,
    /// The caller lacks the role profile this action requires; a hard
    /// validation error on create paths.
    #[error("{0} profile not found for the current user")]
    ProfileMissing(&'static str),
}

/// How far a list action may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    PatientOnly(Uuid),
    DoctorOnly(u32),
    /// A valid request whose result set is empty (e.g. a role with no
    /// profile yet). Not an error.
    Nothing,
}

// -- Patient profiles -----------------------------------------------------

pub fn patient_profile_scope(caller: &Caller) -> Scope {
    match caller {
        Caller::Admin { .. } => Scope::All,
        Caller::Patient { profile: Some(p), .. } => Scope::PatientOnly(p.account_id),
        _ => Scope::Nothing,
    }
}

pub fn can_view_patient_profile(caller: &Caller, profile: &PatientProfile) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Patient { account, .. } if account.id == profile.account_id => Ok(()),
        Caller::Receptionist { account, .. } if profile.created_by == Some(account.id) => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_update_patient_profile(
    caller: &Caller,
    profile: &PatientProfile,
) -> Result<(), AccessError> {
    can_view_patient_profile(caller, profile)
}

pub fn can_register_patient(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } | Caller::Receptionist { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_delete_patient_profile(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

// -- Appointments ---------------------------------------------------------

pub fn appointment_scope(caller: &Caller) -> Scope {
    match caller {
        Caller::Admin { .. } | Caller::Receptionist { .. } => Scope::All,
        Caller::Doctor { profile: Some(d), .. } => Scope::DoctorOnly(d.id),
        Caller::Patient { profile: Some(p), .. } => Scope::PatientOnly(p.account_id),
        _ => Scope::Nothing,
    }
}

fn owns_appointment(caller: &Caller, appointment: &Appointment) -> bool {
    caller.patient_id() == Some(appointment.patient_id)
        || caller.doctor_id() == Some(appointment.doctor_id)
}

pub fn can_view_appointment(caller: &Caller, appointment: &Appointment) -> Result<(), AccessError> {
    if caller.is_staff() || owns_appointment(caller, appointment) {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

pub fn can_update_appointment(caller: &Caller, appointment: &Appointment) -> Result<(), AccessError> {
    can_view_appointment(caller, appointment)
}

/// Patients request appointments for themselves; staff book on behalf of a
/// patient. Returns the patient the appointment must be created for.
pub fn can_create_appointment(
    caller: &Caller,
    requested_patient_id: Option<Uuid>,
) -> Result<Uuid, AccessError> {
    match caller {
        Caller::Patient { profile: Some(p), .. } => Ok(p.account_id),
        Caller::Patient { profile: None, .. } => Err(AccessError::ProfileMissing("Patient")),
        Caller::Admin { .. } | Caller::Receptionist { .. } => {
            requested_patient_id.ok_or(AccessError::Forbidden)
        }
        Caller::Doctor { .. } => Err(AccessError::Forbidden),
    }
}

/// Cancellation is open to staff and to the owning patient.
pub fn can_cancel_appointment(caller: &Caller, appointment: &Appointment) -> Result<(), AccessError> {
    if caller.is_staff() || caller.patient_id() == Some(appointment.patient_id) {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

pub fn can_delete_appointment(caller: &Caller, appointment: &Appointment) -> Result<(), AccessError> {
    can_cancel_appointment(caller, appointment)
}

// -- Medical records ------------------------------------------------------

pub fn medical_record_scope(caller: &Caller) -> Scope {
    match caller {
        Caller::Admin { .. } => Scope::All,
        Caller::Doctor { profile: Some(d), .. } => Scope::DoctorOnly(d.id),
        Caller::Patient { profile: Some(p), .. } => Scope::PatientOnly(p.account_id),
        _ => Scope::Nothing,
    }
}

pub fn can_view_medical_record(caller: &Caller, record: &MedicalRecord) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ if caller.patient_id() == Some(record.patient_id) => Ok(()),
        _ if record.doctor_id.is_some() && caller.doctor_id() == record.doctor_id => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

/// Only the doctor who owns the record (or an admin) may modify it.
pub fn can_update_medical_record(caller: &Caller, record: &MedicalRecord) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ if record.doctor_id.is_some() && caller.doctor_id() == record.doctor_id => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

/// Doctors create records stamped with themselves; admins may create with
/// an explicit doctor or none. Returns the doctor id to stamp.
pub fn can_create_medical_record(
    caller: &Caller,
    requested_doctor_id: Option<u32>,
) -> Result<Option<u32>, AccessError> {
    match caller {
        Caller::Doctor { profile: Some(d), .. } => Ok(Some(d.id)),
        Caller::Doctor { profile: None, .. } => Err(AccessError::ProfileMissing("Doctor")),
        Caller::Admin { .. } => Ok(requested_doctor_id),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_delete_medical_record(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

// -- Lab test orders ------------------------------------------------------

pub fn lab_order_scope(caller: &Caller) -> Scope {
    match caller {
        Caller::Admin { .. } => Scope::All,
        Caller::Doctor { profile: Some(d), .. } => Scope::DoctorOnly(d.id),
        Caller::Patient { profile: Some(p), .. } => Scope::PatientOnly(p.account_id),
        _ => Scope::Nothing,
    }
}

pub fn can_view_lab_order(caller: &Caller, order: &LabTestOrder) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ if caller.patient_id() == Some(order.patient_id) => Ok(()),
        _ if order.ordered_by_doctor_id.is_some()
            && caller.doctor_id() == order.ordered_by_doctor_id =>
        {
            Ok(())
        }
        _ => Err(AccessError::Forbidden),
    }
}

/// Only the ordering doctor (or an admin) may modify an order.
pub fn can_update_lab_order(caller: &Caller, order: &LabTestOrder) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ if order.ordered_by_doctor_id.is_some()
            && caller.doctor_id() == order.ordered_by_doctor_id =>
        {
            Ok(())
        }
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_create_lab_order(
    caller: &Caller,
    requested_doctor_id: Option<u32>,
) -> Result<Option<u32>, AccessError> {
    match caller {
        Caller::Doctor { profile: Some(d), .. } => Ok(Some(d.id)),
        Caller::Doctor { profile: None, .. } => Err(AccessError::ProfileMissing("Doctor")),
        Caller::Admin { .. } => Ok(requested_doctor_id),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_delete_lab_order(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

// -- Bills ----------------------------------------------------------------

pub fn bill_scope(caller: &Caller) -> Scope {
    match caller {
        Caller::Admin { .. } | Caller::Receptionist { .. } => Scope::All,
        Caller::Patient { profile: Some(p), .. } => Scope::PatientOnly(p.account_id),
        _ => Scope::Nothing,
    }
}

pub fn can_view_bill(caller: &Caller, bill: &Bill) -> Result<(), AccessError> {
    if caller.is_staff() || caller.patient_id() == Some(bill.patient_id) {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Bills are mutated by staff only.
pub fn can_update_bill(caller: &Caller) -> Result<(), AccessError> {
    if caller.is_staff() { Ok(()) } else { Err(AccessError::Forbidden) }
}

pub fn can_create_bill(caller: &Caller) -> Result<(), AccessError> {
    can_update_bill(caller)
}

pub fn can_delete_bill(caller: &Caller) -> Result<(), AccessError> {
    can_update_bill(caller)
}

// -- Receptionist profiles ------------------------------------------------

pub fn can_list_receptionists(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_view_receptionist(caller: &Caller, account_id: Uuid) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Receptionist { account, .. } if account.id == account_id => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_update_receptionist(caller: &Caller, account_id: Uuid) -> Result<(), AccessError> {
    can_view_receptionist(caller, account_id)
}

pub fn can_delete_receptionist(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

// -- Doctors & schedules --------------------------------------------------

/// The doctor directory is visible to any authenticated user.
pub fn can_view_doctor_directory(_caller: &Caller) -> Result<(), AccessError> {
    Ok(())
}

pub fn can_manage_doctor(caller: &Caller, doctor_account_id: Uuid) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Doctor { account, .. } if account.id == doctor_account_id => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_delete_doctor(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_manage_schedule(caller: &Caller, schedule: &DoctorSchedule) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Doctor { profile: Some(d), .. } if d.id == schedule.doctor_id => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

pub fn can_create_schedule(caller: &Caller, doctor_id: u32) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Doctor { profile: Some(d), .. } if d.id == doctor_id => Ok(()),
        Caller::Doctor { profile: None, .. } => Err(AccessError::ProfileMissing("Doctor")),
        _ => Err(AccessError::Forbidden),
    }
}

// -- Admin surfaces -------------------------------------------------------

pub fn can_view_admin_reports(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

/// Admin-authenticated registration endpoints.
pub fn can_register_role(caller: &Caller) -> Result<(), AccessError> {
    match caller {
        Caller::Admin { .. } => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use models::{
        Account, AppointmentStatus, DoctorProfile, Gender, NewAccount, Role,
    };

    fn account(role: Role) -> Account {
        Account::from_new_account(NewAccount {
            username: format!("user-{}", Uuid::new_v4()),
            password: "supersecret".to_string(),
            email: "user@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        })
        .unwrap()
    }

    fn admin() -> Caller {
        Caller::Admin { account: account(Role::Admin) }
    }

    fn receptionist() -> Caller {
        Caller::Receptionist { account: account(Role::Receptionist), profile: None }
    }

    fn patient(patient_id: Uuid) -> Caller {
        let mut acct = account(Role::Patient);
        acct.id = patient_id;
        let profile = PatientProfile::new(
            patient_id,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            Gender::Other,
            None,
            None,
            None,
        );
        Caller::Patient { account: acct, profile: Some(profile) }
    }

    fn doctor(doctor_id: u32) -> Caller {
        let acct = account(Role::Doctor);
        let now = Utc::now();
        let profile = DoctorProfile {
            id: doctor_id,
            account_id: acct.id,
            first_name: "Greg".to_string(),
            last_name: "House".to_string(),
            specialization: "Diagnostics".to_string(),
            department: "Internal Medicine".to_string(),
            contact_number: None,
            email: None,
            created_at: now,
            updated_at: now,
        };
        Caller::Doctor { account: acct, profile: Some(profile) }
    }

    fn appointment(patient_id: Uuid, doctor_id: u32) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: 1,
            patient_id,
            doctor_id,
            appointment_datetime: now,
            reason: None,
            status: AppointmentStatus::Requested,
            created_at: now,
            updated_at: now,
        }
    }

    fn medical_record(patient_id: Uuid, doctor_id: Option<u32>) -> MedicalRecord {
        let now = Utc::now();
        MedicalRecord {
            id: 1,
            patient_id,
            doctor_id,
            record_type: "Consultation".to_string(),
            description: "notes".to_string(),
            document: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn appointment_scope_narrows_per_role() {
        let pid = Uuid::new_v4();
        assert_eq!(appointment_scope(&admin()), Scope::All);
        assert_eq!(appointment_scope(&receptionist()), Scope::All);
        assert_eq!(appointment_scope(&doctor(3)), Scope::DoctorOnly(3));
        assert_eq!(appointment_scope(&patient(pid)), Scope::PatientOnly(pid));
    }

    #[test]
    fn profileless_caller_lists_nothing_but_cannot_create() {
        let orphan = Caller::Patient { account: account(Role::Patient), profile: None };
        assert_eq!(appointment_scope(&orphan), Scope::Nothing);
        assert_eq!(
            can_create_appointment(&orphan, None),
            Err(AccessError::ProfileMissing("Patient"))
        );
    }

    #[test]
    fn patient_sees_only_their_own_appointments() {
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let caller = patient(mine);
        assert!(can_view_appointment(&caller, &appointment(mine, 1)).is_ok());
        assert_eq!(
            can_view_appointment(&caller, &appointment(theirs, 1)),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn patient_creates_for_self_regardless_of_payload() {
        let pid = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_eq!(can_create_appointment(&patient(pid), Some(other)).unwrap(), pid);
    }

    #[test]
    fn staff_create_on_behalf_of_a_named_patient() {
        let pid = Uuid::new_v4();
        assert_eq!(can_create_appointment(&receptionist(), Some(pid)).unwrap(), pid);
        assert_eq!(can_create_appointment(&receptionist(), None), Err(AccessError::Forbidden));
        assert_eq!(can_create_appointment(&doctor(1), Some(pid)), Err(AccessError::Forbidden));
    }

    #[test]
    fn doctor_cannot_touch_another_doctors_record() {
        let pid = Uuid::new_v4();
        let record = medical_record(pid, Some(2));
        assert_eq!(can_update_medical_record(&doctor(1), &record), Err(AccessError::Forbidden));
        assert!(can_update_medical_record(&doctor(2), &record).is_ok());
        assert!(can_update_medical_record(&admin(), &record).is_ok());
    }

    #[test]
    fn patient_may_view_but_not_update_their_record() {
        let pid = Uuid::new_v4();
        let record = medical_record(pid, Some(2));
        let caller = patient(pid);
        assert!(can_view_medical_record(&caller, &record).is_ok());
        assert_eq!(can_update_medical_record(&caller, &record), Err(AccessError::Forbidden));
    }

    #[test]
    fn receptionist_gets_no_clinical_scope() {
        assert_eq!(medical_record_scope(&receptionist()), Scope::Nothing);
        assert_eq!(lab_order_scope(&receptionist()), Scope::Nothing);
        assert_eq!(bill_scope(&receptionist()), Scope::All);
    }

    #[test]
    fn doctor_stamp_overrides_requested_doctor() {
        assert_eq!(can_create_medical_record(&doctor(4), Some(9)).unwrap(), Some(4));
        assert_eq!(can_create_medical_record(&admin(), Some(9)).unwrap(), Some(9));
        assert_eq!(
            can_create_medical_record(&receptionist(), None),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn receptionist_profile_visibility_follows_creator() {
        let caller = receptionist();
        let creator = caller.account().id;
        let pid = Uuid::new_v4();
        let mut profile = PatientProfile::new(
            pid,
            NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            Gender::Male,
            None,
            None,
            Some(creator),
        );
        assert!(can_view_patient_profile(&caller, &profile).is_ok());
        profile.created_by = Some(Uuid::new_v4());
        assert_eq!(can_view_patient_profile(&caller, &profile), Err(AccessError::Forbidden));
    }

    #[test]
    fn only_staff_touch_bills_and_only_admin_deletes_clinical_data() {
        let pid = Uuid::new_v4();
        assert!(can_create_bill(&receptionist()).is_ok());
        assert_eq!(can_create_bill(&patient(pid)), Err(AccessError::Forbidden));
        assert!(can_delete_bill(&receptionist()).is_ok());
        assert_eq!(can_delete_lab_order(&receptionist()), Err(AccessError::Forbidden));
        assert_eq!(can_delete_medical_record(&doctor(1)), Err(AccessError::Forbidden));
    }
}
