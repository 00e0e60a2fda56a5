// models/src/medical/mod.rs
pub mod account;
pub mod appointment;
pub mod bill;
pub mod doctor;
pub mod gender;
pub mod lab_test;
pub mod medical_record;
pub mod patient;
pub mod receptionist;
pub mod role;
pub mod schedule;
pub mod system_log;

pub use account::{Account, NewAccount};
pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use bill::{Bill, BillStatus, NewBill};
pub use doctor::{DoctorProfile, NewDoctorProfile};
pub use gender::Gender;
pub use lab_test::{LabTestOrder, LabTestStatus, NewLabTestOrder};
pub use medical_record::{MedicalRecord, NewMedicalRecord};
pub use patient::{LegacyPatientRecord, NewLegacyPatientRecord, PatientProfile};
pub use receptionist::{NewReceptionistProfile, ReceptionistProfile};
pub use role::Role;
pub use schedule::{DayOfWeek, DoctorSchedule, NewDoctorSchedule};
pub use system_log::{LogLevel, SystemLog};
