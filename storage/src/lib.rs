// storage/src/lib.rs
//
// The persistence seam of the system. `HmsStore` is the trait every layer
// above talks to; `MemoryStore` is the in-process implementation whose
// single lock provides the transactional guarantees a relational store
// would. Combined operations (account + profile) hold the lock across all
// of their writes, which is the transaction boundary the registration
// orchestrator relies on.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use models::{
    Account, Appointment, AppointmentStatus, Bill, DoctorProfile, DoctorSchedule,
    HmsResult, LabTestOrder, LegacyPatientRecord, LogLevel, MedicalRecord, NewAppointment,
    NewBill, NewDoctorProfile, NewDoctorSchedule, NewLabTestOrder, NewLegacyPatientRecord,
    NewMedicalRecord, NewReceptionistProfile, PatientProfile, ReceptionistProfile, SystemLog,
};

pub use memory::MemoryStore;

#[async_trait]
pub trait HmsStore: Send + Sync {
    // -- Accounts ---------------------------------------------------------
    /// Creates an account, rejecting a duplicate username with a conflict
    /// error. This is the uniqueness guarantee; application-level pre-checks
    /// are a convenience only.
    async fn create_account(&self, account: Account) -> HmsResult<Account>;
    async fn get_account(&self, id: Uuid) -> HmsResult<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> HmsResult<Option<Account>>;
    /// Removes the account and anything hanging off it (role profiles,
    /// group memberships). Used by the compensating rollback path.
    async fn delete_account(&self, id: Uuid) -> HmsResult<()>;
    async fn touch_last_login(&self, id: Uuid) -> HmsResult<()>;

    // -- Combined atomic creations ---------------------------------------
    /// Account + patient profile: both become visible or neither does.
    async fn create_account_with_patient(
        &self,
        account: Account,
        profile: PatientProfile,
    ) -> HmsResult<(Account, PatientProfile)>;
    async fn create_account_with_doctor(
        &self,
        account: Account,
        profile: NewDoctorProfile,
    ) -> HmsResult<(Account, DoctorProfile)>;
    async fn create_account_with_receptionist(
        &self,
        account: Account,
        profile: NewReceptionistProfile,
    ) -> HmsResult<(Account, ReceptionistProfile)>;

    // -- Patient profiles -------------------------------------------------
    async fn get_patient_profile(&self, account_id: Uuid) -> HmsResult<Option<PatientProfile>>;
    async fn list_patient_profiles(&self) -> HmsResult<Vec<PatientProfile>>;
    async fn update_patient_profile(&self, profile: PatientProfile) -> HmsResult<PatientProfile>;
    async fn delete_patient_profile(&self, account_id: Uuid) -> HmsResult<()>;

    // -- Legacy patient registry -----------------------------------------
    /// Best-effort secondary write target; rejects a duplicate reg_num.
    async fn create_legacy_patient(
        &self,
        record: NewLegacyPatientRecord,
    ) -> HmsResult<LegacyPatientRecord>;
    async fn list_legacy_patients(&self) -> HmsResult<Vec<LegacyPatientRecord>>;

    // -- Doctors ----------------------------------------------------------
    async fn create_doctor(&self, profile: NewDoctorProfile) -> HmsResult<DoctorProfile>;
    async fn get_doctor(&self, id: u32) -> HmsResult<Option<DoctorProfile>>;
    async fn get_doctor_by_account(&self, account_id: Uuid) -> HmsResult<Option<DoctorProfile>>;
    async fn list_doctors(&self) -> HmsResult<Vec<DoctorProfile>>;
    async fn update_doctor(&self, profile: DoctorProfile) -> HmsResult<DoctorProfile>;
    /// Deletes the doctor; their appointments and schedules go with them,
    /// while medical records and lab orders keep the row with the doctor
    /// reference nulled.
    async fn delete_doctor(&self, id: u32) -> HmsResult<()>;

    // -- Receptionists ----------------------------------------------------
    async fn create_receptionist(
        &self,
        profile: NewReceptionistProfile,
    ) -> HmsResult<ReceptionistProfile>;
    async fn get_receptionist(&self, id: u32) -> HmsResult<Option<ReceptionistProfile>>;
    async fn get_receptionist_by_account(
        &self,
        account_id: Uuid,
    ) -> HmsResult<Option<ReceptionistProfile>>;
    async fn list_receptionists(&self) -> HmsResult<Vec<ReceptionistProfile>>;
    async fn update_receptionist(
        &self,
        profile: ReceptionistProfile,
    ) -> HmsResult<ReceptionistProfile>;
    async fn delete_receptionist(&self, id: u32) -> HmsResult<()>;

    // -- Appointments -----------------------------------------------------
    async fn create_appointment(&self, appointment: NewAppointment) -> HmsResult<Appointment>;
    async fn get_appointment(&self, id: u32) -> HmsResult<Option<Appointment>>;
    /// Newest first, by appointment time.
    async fn list_appointments(&self) -> HmsResult<Vec<Appointment>>;
    async fn update_appointment(&self, appointment: Appointment) -> HmsResult<Appointment>;
    async fn delete_appointment(&self, id: u32) -> HmsResult<()>;
    /// All appointments falling on `date` with the given status. Used by
    /// the reminder job.
    async fn list_appointments_on_date(
        &self,
        date: NaiveDate,
        status: AppointmentStatus,
    ) -> HmsResult<Vec<Appointment>>;

    // -- Medical records --------------------------------------------------
    async fn create_medical_record(&self, record: NewMedicalRecord) -> HmsResult<MedicalRecord>;
    async fn get_medical_record(&self, id: u32) -> HmsResult<Option<MedicalRecord>>;
    async fn list_medical_records(&self) -> HmsResult<Vec<MedicalRecord>>;
    async fn update_medical_record(&self, record: MedicalRecord) -> HmsResult<MedicalRecord>;
    async fn delete_medical_record(&self, id: u32) -> HmsResult<()>;

    // -- Lab test orders --------------------------------------------------
    async fn create_lab_order(&self, order: NewLabTestOrder) -> HmsResult<LabTestOrder>;
    async fn get_lab_order(&self, id: u32) -> HmsResult<Option<LabTestOrder>>;
    async fn list_lab_orders(&self) -> HmsResult<Vec<LabTestOrder>>;
    async fn update_lab_order(&self, order: LabTestOrder) -> HmsResult<LabTestOrder>;
    async fn delete_lab_order(&self, id: u32) -> HmsResult<()>;

    // -- Bills ------------------------------------------------------------
    async fn create_bill(&self, bill: NewBill) -> HmsResult<Bill>;
    async fn get_bill(&self, id: u32) -> HmsResult<Option<Bill>>;
    async fn list_bills(&self) -> HmsResult<Vec<Bill>>;
    async fn update_bill(&self, bill: Bill) -> HmsResult<Bill>;
    async fn delete_bill(&self, id: u32) -> HmsResult<()>;

    // -- Doctor schedules -------------------------------------------------
    /// Rejects a second row for the same (doctor, day) pair.
    async fn create_schedule(&self, schedule: NewDoctorSchedule) -> HmsResult<DoctorSchedule>;
    async fn get_schedule(&self, id: u32) -> HmsResult<Option<DoctorSchedule>>;
    async fn list_schedules(&self) -> HmsResult<Vec<DoctorSchedule>>;
    async fn update_schedule(&self, schedule: DoctorSchedule) -> HmsResult<DoctorSchedule>;
    async fn delete_schedule(&self, id: u32) -> HmsResult<()>;

    // -- Groups -----------------------------------------------------------
    async fn ensure_group(&self, name: &str) -> HmsResult<()>;
    async fn group_exists(&self, name: &str) -> HmsResult<bool>;
    /// Attaches the account to the named group. Returns `false` (not an
    /// error) when the group does not exist.
    async fn add_account_to_group(&self, account_id: Uuid, name: &str) -> HmsResult<bool>;

    // -- System logs ------------------------------------------------------
    async fn append_log(&self, level: LogLevel, message: &str) -> HmsResult<SystemLog>;
    /// Newest first, optionally filtered by level.
    async fn list_logs(&self, level: Option<LogLevel>) -> HmsResult<Vec<SystemLog>>;
}
