// storage/src/memory.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use models::{
    Account, Appointment, AppointmentStatus, Bill, BillStatus, DoctorProfile, DoctorSchedule,
    HmsError, HmsResult, LabTestOrder, LabTestStatus, LegacyPatientRecord, LogLevel,
    MedicalRecord, NewAppointment, NewBill, NewDoctorProfile, NewDoctorSchedule, NewLabTestOrder,
    NewLegacyPatientRecord, NewMedicalRecord, NewReceptionistProfile, PatientProfile,
    ReceptionistProfile, SystemLog,
};

use crate::HmsStore;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    username_index: HashMap<String, Uuid>,
    patients: HashMap<Uuid, PatientProfile>,
    legacy_patients: BTreeMap<u32, LegacyPatientRecord>,
    reg_num_index: HashSet<String>,
    doctors: BTreeMap<u32, DoctorProfile>,
    receptionists: BTreeMap<u32, ReceptionistProfile>,
    appointments: BTreeMap<u32, Appointment>,
    medical_records: BTreeMap<u32, MedicalRecord>,
    lab_orders: BTreeMap<u32, LabTestOrder>,
    bills: BTreeMap<u32, Bill>,
    schedules: BTreeMap<u32, DoctorSchedule>,
    groups: HashMap<String, HashSet<Uuid>>,
    logs: Vec<SystemLog>,
    next_legacy_id: u32,
    next_doctor_id: u32,
    next_receptionist_id: u32,
    next_appointment_id: u32,
    next_record_id: u32,
    next_lab_order_id: u32,
    next_bill_id: u32,
    next_schedule_id: u32,
    next_log_id: u32,
    #[cfg(feature = "test-suite")]
    fail_next_receptionist_insert: bool,
}

impl Inner {
    fn next_id(counter: &mut u32) -> u32 {
        *counter += 1;
        *counter
    }

    fn insert_account(&mut self, account: Account) -> HmsResult<Account> {
        if self.username_index.contains_key(&account.username) {
            return Err(HmsError::conflict(
                "Account",
                format!("username '{}' is already taken", account.username),
            ));
        }
        self.username_index.insert(account.username.clone(), account.id);
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn insert_doctor(&mut self, profile: NewDoctorProfile) -> HmsResult<DoctorProfile> {
        let now = Utc::now();
        let doctor = DoctorProfile {
            id: Self::next_id(&mut self.next_doctor_id),
            account_id: profile.account_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            specialization: profile.specialization,
            department: profile.department,
            contact_number: profile.contact_number,
            email: profile.email,
            created_at: now,
            updated_at: now,
        };
        self.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    fn insert_receptionist(
        &mut self,
        profile: NewReceptionistProfile,
    ) -> HmsResult<ReceptionistProfile> {
        #[cfg(feature = "test-suite")]
        if self.fail_next_receptionist_insert {
            self.fail_next_receptionist_insert = false;
            return Err(HmsError::StorageError("injected receptionist insert failure".to_string()));
        }
        let now = Utc::now();
        let receptionist = ReceptionistProfile {
            id: Self::next_id(&mut self.next_receptionist_id),
            account_id: profile.account_id,
            contact_number: profile.contact_number,
            address: profile.address,
            date_of_birth: profile.date_of_birth,
            join_date: now.date_naive(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.receptionists.insert(receptionist.id, receptionist.clone());
        Ok(receptionist)
    }

    fn require_patient(&self, account_id: Uuid) -> HmsResult<()> {
        if self.patients.contains_key(&account_id) {
            Ok(())
        } else {
            Err(HmsError::not_found("PatientProfile", account_id))
        }
    }

    fn require_doctor(&self, id: u32) -> HmsResult<()> {
        if self.doctors.contains_key(&id) {
            Ok(())
        } else {
            Err(HmsError::not_found("DoctorProfile", id))
        }
    }
}

/// In-memory implementation of `HmsStore`. One mutex guards all collections;
/// any method that performs several writes does so under a single lock
/// acquisition, which is what makes the combined creations atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> HmsResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|e| HmsError::LockError(e.to_string()))
    }

    /// Makes the next standalone receptionist insert fail, so tests can
    /// exercise the compensating-rollback path of the registration flow.
    #[cfg(feature = "test-suite")]
    pub fn fail_next_receptionist_insert(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_next_receptionist_insert = true;
        }
    }
}

#[async_trait]
impl HmsStore for MemoryStore {
    async fn create_account(&self, account: Account) -> HmsResult<Account> {
        self.lock()?.insert_account(account)
    }

    async fn get_account(&self, id: Uuid) -> HmsResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn get_account_by_username(&self, username: &str) -> HmsResult<Option<Account>> {
        let inner = self.lock()?;
        Ok(inner.username_index.get(username).and_then(|id| inner.accounts.get(id)).cloned())
    }

    async fn delete_account(&self, id: Uuid) -> HmsResult<()> {
        let mut inner = self.lock()?;
        let account = inner
            .accounts
            .remove(&id)
            .ok_or_else(|| HmsError::not_found("Account", id))?;
        inner.username_index.remove(&account.username);
        inner.patients.remove(&id);
        inner.doctors.retain(|_, d| d.account_id != id);
        inner.receptionists.retain(|_, r| r.account_id != id);
        for members in inner.groups.values_mut() {
            members.remove(&id);
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> HmsResult<()> {
        let mut inner = self.lock()?;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| HmsError::not_found("Account", id))?;
        account.last_login = Some(Utc::now());
        Ok(())
    }

    async fn create_account_with_patient(
        &self,
        account: Account,
        profile: PatientProfile,
    ) -> HmsResult<(Account, PatientProfile)> {
        let mut inner = self.lock()?;
        let account = inner.insert_account(account)?;
        inner.patients.insert(profile.account_id, profile.clone());
        Ok((account, profile))
    }

    async fn create_account_with_doctor(
        &self,
        account: Account,
        profile: NewDoctorProfile,
    ) -> HmsResult<(Account, DoctorProfile)> {
        let mut inner = self.lock()?;
        let account = inner.insert_account(account)?;
        let doctor = inner.insert_doctor(profile)?;
        Ok((account, doctor))
    }

    async fn create_account_with_receptionist(
        &self,
        account: Account,
        profile: NewReceptionistProfile,
    ) -> HmsResult<(Account, ReceptionistProfile)> {
        let mut inner = self.lock()?;
        let account = inner.insert_account(account)?;
        match inner.insert_receptionist(profile) {
            Ok(receptionist) => Ok((account, receptionist)),
            Err(e) => {
                // keep the combined creation atomic
                inner.username_index.remove(&account.username);
                inner.accounts.remove(&account.id);
                Err(e)
            }
        }
    }

    async fn get_patient_profile(&self, account_id: Uuid) -> HmsResult<Option<PatientProfile>> {
        Ok(self.lock()?.patients.get(&account_id).cloned())
    }

    async fn list_patient_profiles(&self) -> HmsResult<Vec<PatientProfile>> {
        let mut profiles: Vec<_> = self.lock()?.patients.values().cloned().collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn update_patient_profile(&self, mut profile: PatientProfile) -> HmsResult<PatientProfile> {
        let mut inner = self.lock()?;
        if !inner.patients.contains_key(&profile.account_id) {
            return Err(HmsError::not_found("PatientProfile", profile.account_id));
        }
        profile.updated_at = Utc::now();
        inner.patients.insert(profile.account_id, profile.clone());
        Ok(profile)
    }

    async fn delete_patient_profile(&self, account_id: Uuid) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner
            .patients
            .remove(&account_id)
            .ok_or_else(|| HmsError::not_found("PatientProfile", account_id))?;
        // everything owned by the patient goes with the profile
        inner.appointments.retain(|_, a| a.patient_id != account_id);
        inner.medical_records.retain(|_, r| r.patient_id != account_id);
        inner.lab_orders.retain(|_, o| o.patient_id != account_id);
        inner.bills.retain(|_, b| b.patient_id != account_id);
        Ok(())
    }

    async fn create_legacy_patient(
        &self,
        record: NewLegacyPatientRecord,
    ) -> HmsResult<LegacyPatientRecord> {
        let mut inner = self.lock()?;
        if inner.reg_num_index.contains(&record.reg_num) {
            return Err(HmsError::conflict(
                "LegacyPatientRecord",
                format!("reg_num '{}' is already taken", record.reg_num),
            ));
        }
        let legacy = LegacyPatientRecord {
            id: Inner::next_id(&mut inner.next_legacy_id),
            reg_num: record.reg_num,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            contact_number: record.contact_number,
            email: record.email,
        };
        inner.reg_num_index.insert(legacy.reg_num.clone());
        inner.legacy_patients.insert(legacy.id, legacy.clone());
        Ok(legacy)
    }

    async fn list_legacy_patients(&self) -> HmsResult<Vec<LegacyPatientRecord>> {
        Ok(self.lock()?.legacy_patients.values().cloned().collect())
    }

    async fn create_doctor(&self, profile: NewDoctorProfile) -> HmsResult<DoctorProfile> {
        self.lock()?.insert_doctor(profile)
    }

    async fn get_doctor(&self, id: u32) -> HmsResult<Option<DoctorProfile>> {
        Ok(self.lock()?.doctors.get(&id).cloned())
    }

    async fn get_doctor_by_account(&self, account_id: Uuid) -> HmsResult<Option<DoctorProfile>> {
        Ok(self.lock()?.doctors.values().find(|d| d.account_id == account_id).cloned())
    }

    async fn list_doctors(&self) -> HmsResult<Vec<DoctorProfile>> {
        Ok(self.lock()?.doctors.values().cloned().collect())
    }

    async fn update_doctor(&self, mut profile: DoctorProfile) -> HmsResult<DoctorProfile> {
        let mut inner = self.lock()?;
        if !inner.doctors.contains_key(&profile.id) {
            return Err(HmsError::not_found("DoctorProfile", profile.id));
        }
        profile.updated_at = Utc::now();
        inner.doctors.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete_doctor(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner.doctors.remove(&id).ok_or_else(|| HmsError::not_found("DoctorProfile", id))?;
        inner.appointments.retain(|_, a| a.doctor_id != id);
        inner.schedules.retain(|_, s| s.doctor_id != id);
        // clinical history survives the doctor; only the reference is cleared
        for record in inner.medical_records.values_mut() {
            if record.doctor_id == Some(id) {
                record.doctor_id = None;
            }
        }
        for order in inner.lab_orders.values_mut() {
            if order.ordered_by_doctor_id == Some(id) {
                order.ordered_by_doctor_id = None;
            }
        }
        Ok(())
    }

    async fn create_receptionist(
        &self,
        profile: NewReceptionistProfile,
    ) -> HmsResult<ReceptionistProfile> {
        self.lock()?.insert_receptionist(profile)
    }

    async fn get_receptionist(&self, id: u32) -> HmsResult<Option<ReceptionistProfile>> {
        Ok(self.lock()?.receptionists.get(&id).cloned())
    }

    async fn get_receptionist_by_account(
        &self,
        account_id: Uuid,
    ) -> HmsResult<Option<ReceptionistProfile>> {
        Ok(self.lock()?.receptionists.values().find(|r| r.account_id == account_id).cloned())
    }

    async fn list_receptionists(&self) -> HmsResult<Vec<ReceptionistProfile>> {
        Ok(self.lock()?.receptionists.values().cloned().collect())
    }

    async fn update_receptionist(
        &self,
        mut profile: ReceptionistProfile,
    ) -> HmsResult<ReceptionistProfile> {
        let mut inner = self.lock()?;
        if !inner.receptionists.contains_key(&profile.id) {
            return Err(HmsError::not_found("ReceptionistProfile", profile.id));
        }
        profile.updated_at = Utc::now();
        inner.receptionists.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete_receptionist(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner
            .receptionists
            .remove(&id)
            .ok_or_else(|| HmsError::not_found("ReceptionistProfile", id))?;
        Ok(())
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> HmsResult<Appointment> {
        let mut inner = self.lock()?;
        inner.require_patient(appointment.patient_id)?;
        inner.require_doctor(appointment.doctor_id)?;
        let now = Utc::now();
        let appointment = Appointment {
            id: Inner::next_id(&mut inner.next_appointment_id),
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            appointment_datetime: appointment.appointment_datetime,
            reason: appointment.reason,
            status: appointment.status,
            created_at: now,
            updated_at: now,
        };
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: u32) -> HmsResult<Option<Appointment>> {
        Ok(self.lock()?.appointments.get(&id).cloned())
    }

    async fn list_appointments(&self) -> HmsResult<Vec<Appointment>> {
        let mut appointments: Vec<_> = self.lock()?.appointments.values().cloned().collect();
        appointments.sort_by(|a, b| b.appointment_datetime.cmp(&a.appointment_datetime));
        Ok(appointments)
    }

    async fn update_appointment(&self, mut appointment: Appointment) -> HmsResult<Appointment> {
        let mut inner = self.lock()?;
        if !inner.appointments.contains_key(&appointment.id) {
            return Err(HmsError::not_found("Appointment", appointment.id));
        }
        appointment.updated_at = Utc::now();
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner.appointments.remove(&id).ok_or_else(|| HmsError::not_found("Appointment", id))?;
        Ok(())
    }

    async fn list_appointments_on_date(
        &self,
        date: NaiveDate,
        status: AppointmentStatus,
    ) -> HmsResult<Vec<Appointment>> {
        let mut matches: Vec<_> = self
            .lock()?
            .appointments
            .values()
            .filter(|a| a.status == status && a.appointment_datetime.date_naive() == date)
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.appointment_datetime);
        Ok(matches)
    }

    async fn create_medical_record(&self, record: NewMedicalRecord) -> HmsResult<MedicalRecord> {
        let mut inner = self.lock()?;
        inner.require_patient(record.patient_id)?;
        if let Some(doctor_id) = record.doctor_id {
            inner.require_doctor(doctor_id)?;
        }
        let now = Utc::now();
        let record = MedicalRecord {
            id: Inner::next_id(&mut inner.next_record_id),
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            record_type: record.record_type,
            description: record.description,
            document: record.document,
            created_at: now,
            updated_at: now,
        };
        inner.medical_records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_medical_record(&self, id: u32) -> HmsResult<Option<MedicalRecord>> {
        Ok(self.lock()?.medical_records.get(&id).cloned())
    }

    async fn list_medical_records(&self) -> HmsResult<Vec<MedicalRecord>> {
        Ok(self.lock()?.medical_records.values().cloned().collect())
    }

    async fn update_medical_record(&self, mut record: MedicalRecord) -> HmsResult<MedicalRecord> {
        let mut inner = self.lock()?;
        if !inner.medical_records.contains_key(&record.id) {
            return Err(HmsError::not_found("MedicalRecord", record.id));
        }
        record.updated_at = Utc::now();
        inner.medical_records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_medical_record(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner
            .medical_records
            .remove(&id)
            .ok_or_else(|| HmsError::not_found("MedicalRecord", id))?;
        Ok(())
    }

    async fn create_lab_order(&self, order: NewLabTestOrder) -> HmsResult<LabTestOrder> {
        let mut inner = self.lock()?;
        inner.require_patient(order.patient_id)?;
        if let Some(doctor_id) = order.ordered_by_doctor_id {
            inner.require_doctor(doctor_id)?;
        }
        let now = Utc::now();
        let order = LabTestOrder {
            id: Inner::next_id(&mut inner.next_lab_order_id),
            patient_id: order.patient_id,
            ordered_by_doctor_id: order.ordered_by_doctor_id,
            appointment_id: order.appointment_id,
            test_name: order.test_name,
            status: LabTestStatus::PendingSample,
            order_datetime: now,
            sample_collection_datetime: None,
            results_expected_datetime: order.results_expected_datetime,
            results_ready_datetime: None,
            result_summary: None,
            result_document: None,
            actual_cost: order.actual_cost,
            notes_by_doctor: order.notes_by_doctor,
            updated_at: now,
        };
        inner.lab_orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_lab_order(&self, id: u32) -> HmsResult<Option<LabTestOrder>> {
        Ok(self.lock()?.lab_orders.get(&id).cloned())
    }

    async fn list_lab_orders(&self) -> HmsResult<Vec<LabTestOrder>> {
        let mut orders: Vec<_> = self.lock()?.lab_orders.values().cloned().collect();
        orders.sort_by(|a, b| b.order_datetime.cmp(&a.order_datetime));
        Ok(orders)
    }

    async fn update_lab_order(&self, mut order: LabTestOrder) -> HmsResult<LabTestOrder> {
        let mut inner = self.lock()?;
        if !inner.lab_orders.contains_key(&order.id) {
            return Err(HmsError::not_found("LabTestOrder", order.id));
        }
        order.updated_at = Utc::now();
        inner.lab_orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete_lab_order(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner.lab_orders.remove(&id).ok_or_else(|| HmsError::not_found("LabTestOrder", id))?;
        Ok(())
    }

    async fn create_bill(&self, bill: NewBill) -> HmsResult<Bill> {
        let mut inner = self.lock()?;
        inner.require_patient(bill.patient_id)?;
        let now = Utc::now();
        let bill = Bill {
            id: Inner::next_id(&mut inner.next_bill_id),
            patient_id: bill.patient_id,
            appointment_id: bill.appointment_id,
            amount: bill.amount,
            description: bill.description,
            status: BillStatus::Pending,
            bill_date: now.date_naive(),
            due_date: bill.due_date,
            payment_method: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.bills.insert(bill.id, bill.clone());
        Ok(bill)
    }

    async fn get_bill(&self, id: u32) -> HmsResult<Option<Bill>> {
        Ok(self.lock()?.bills.get(&id).cloned())
    }

    async fn list_bills(&self) -> HmsResult<Vec<Bill>> {
        Ok(self.lock()?.bills.values().cloned().collect())
    }

    async fn update_bill(&self, mut bill: Bill) -> HmsResult<Bill> {
        let mut inner = self.lock()?;
        if !inner.bills.contains_key(&bill.id) {
            return Err(HmsError::not_found("Bill", bill.id));
        }
        bill.updated_at = Utc::now();
        inner.bills.insert(bill.id, bill.clone());
        Ok(bill)
    }

    async fn delete_bill(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner.bills.remove(&id).ok_or_else(|| HmsError::not_found("Bill", id))?;
        Ok(())
    }

    async fn create_schedule(&self, schedule: NewDoctorSchedule) -> HmsResult<DoctorSchedule> {
        let mut inner = self.lock()?;
        inner.require_doctor(schedule.doctor_id)?;
        let taken = inner
            .schedules
            .values()
            .any(|s| s.doctor_id == schedule.doctor_id && s.day_of_week == schedule.day_of_week);
        if taken {
            return Err(HmsError::conflict(
                "DoctorSchedule",
                format!("doctor {} already has a schedule for {}", schedule.doctor_id, schedule.day_of_week),
            ));
        }
        let schedule = DoctorSchedule {
            id: Inner::next_id(&mut inner.next_schedule_id),
            doctor_id: schedule.doctor_id,
            day_of_week: schedule.day_of_week,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            max_appointments: schedule.max_appointments,
            is_available: schedule.is_available,
        };
        inner.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn get_schedule(&self, id: u32) -> HmsResult<Option<DoctorSchedule>> {
        Ok(self.lock()?.schedules.get(&id).cloned())
    }

    async fn list_schedules(&self) -> HmsResult<Vec<DoctorSchedule>> {
        Ok(self.lock()?.schedules.values().cloned().collect())
    }

    async fn update_schedule(&self, schedule: DoctorSchedule) -> HmsResult<DoctorSchedule> {
        let mut inner = self.lock()?;
        if !inner.schedules.contains_key(&schedule.id) {
            return Err(HmsError::not_found("DoctorSchedule", schedule.id));
        }
        inner.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn delete_schedule(&self, id: u32) -> HmsResult<()> {
        let mut inner = self.lock()?;
        inner.schedules.remove(&id).ok_or_else(|| HmsError::not_found("DoctorSchedule", id))?;
        Ok(())
    }

    async fn ensure_group(&self, name: &str) -> HmsResult<()> {
        self.lock()?.groups.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn group_exists(&self, name: &str) -> HmsResult<bool> {
        Ok(self.lock()?.groups.contains_key(name))
    }

    async fn add_account_to_group(&self, account_id: Uuid, name: &str) -> HmsResult<bool> {
        let mut inner = self.lock()?;
        match inner.groups.get_mut(name) {
            Some(members) => {
                members.insert(account_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_log(&self, level: LogLevel, message: &str) -> HmsResult<SystemLog> {
        let mut inner = self.lock()?;
        let entry = SystemLog {
            id: Inner::next_id(&mut inner.next_log_id),
            level,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        inner.logs.push(entry.clone());
        Ok(entry)
    }

    async fn list_logs(&self, level: Option<LogLevel>) -> HmsResult<Vec<SystemLog>> {
        let inner = self.lock()?;
        let mut logs: Vec<_> = inner
            .logs
            .iter()
            .filter(|l| level.map_or(true, |wanted| l.level == wanted))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(logs)
    }
}
