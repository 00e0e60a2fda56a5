// rest_api/src/handlers/mod.rs
pub mod admin;
pub mod appointments;
pub mod auth;
pub mod bills;
pub mod doctors;
pub mod medical_records;
pub mod patients;
pub mod receptionists;
pub mod registration;
pub mod schedules;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::Json;

    use models::{AppointmentStatus, NewAppointment};
    use security::caller::Caller;
    use security::registration::{
        self as flow, DoctorRegistration, LegacyWritePolicy, PatientRegistration,
        ReceptionistRegistration,
    };
    use storage::{HmsStore, MemoryStore};

    use crate::config::RestApiConfig;
    use crate::extract::AuthCaller;
    use crate::{ApiError, AppState};

    use super::*;

    fn state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), RestApiConfig::default());
        (state, store)
    }

    fn patient_input(username: &str) -> PatientRegistration {
        PatientRegistration {
            username: username.to_string(),
            password: "supersecret".to_string(),
            confirm_password: None,
            email: Some(format!("{username}@example.com")),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            gender: "F".to_string(),
            reg_num: None,
            contact_number: Some("1234567890".to_string()),
            address: Some("12 Main St".to_string()),
        }
    }

    fn doctor_input(username: &str) -> DoctorRegistration {
        DoctorRegistration {
            username: username.to_string(),
            password: "supersecret".to_string(),
            confirm_password: None,
            email: Some(format!("{username}@example.com")),
            first_name: "Doc".to_string(),
            last_name: username.to_string(),
            specialization: "General".to_string(),
            department: "Medicine".to_string(),
            contact_number: None,
        }
    }

    async fn caller(store: &MemoryStore, username: &str) -> Caller {
        Caller::resolve(store, username).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn no_csrf_patient_registration_normalizes_gender_in_payload() {
        let (state, _) = state();
        let (status, Json(body)) = registration::register_patient_no_csrf(
            State(state),
            Json(patient_input("alice")),
        )
        .await
        .unwrap();

        assert_eq!(status, axum::http::StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["profile"]["gender"], "Female");
    }

    #[tokio::test]
    async fn doctor_cannot_patch_another_doctors_medical_record() {
        let (state, store) = state();
        flow::register_doctor(store.as_ref(), doctor_input("doctor_a")).await.unwrap();
        flow::register_doctor(store.as_ref(), doctor_input("doctor_b")).await.unwrap();
        let patient = flow::register_patient(
            store.as_ref(),
            patient_input("alice"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();

        let doctor_b = caller(&store, "doctor_b").await;
        let (_, Json(created)) = medical_records::create(
            State(state.clone()),
            AuthCaller(doctor_b),
            Json(medical_records::CreateMedicalRecordRequest {
                patient_id: patient.account.id,
                doctor_id: None,
                record_type: "Consultation".to_string(),
                description: "initial notes".to_string(),
                document: None,
            }),
        )
        .await
        .unwrap();
        let record_id = created["data"]["id"].as_u64().unwrap() as u32;

        let doctor_a = caller(&store, "doctor_a").await;
        let err = medical_records::update(
            State(state),
            AuthCaller(doctor_a),
            Path(record_id),
            Json(medical_records::UpdateMedicalRecordRequest {
                record_type: None,
                description: Some("tampered".to_string()),
                document: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn cancel_is_rejected_from_terminal_states_without_mutation() {
        let (state, store) = state();
        flow::register_doctor(store.as_ref(), doctor_input("doc")).await.unwrap();
        let patient = flow::register_patient(
            store.as_ref(),
            patient_input("alice"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();
        let doctor_id = store.get_account_by_username("doc").await.unwrap().unwrap().id;
        let doctor_id =
            store.get_doctor_by_account(doctor_id).await.unwrap().unwrap().id;

        let appointment = store
            .create_appointment(NewAppointment {
                patient_id: patient.account.id,
                doctor_id,
                appointment_datetime: chrono::Utc::now(),
                reason: None,
                status: AppointmentStatus::Completed,
            })
            .await
            .unwrap();

        let alice = caller(&store, "alice").await;
        let err = appointments::cancel(State(state), AuthCaller(alice), Path(appointment.id))
            .await
            .unwrap_err();
        match err {
            ApiError::BadRequest(msg) => assert!(msg.contains("cannot be cancelled")),
            other => panic!("expected bad request, got {other:?}"),
        }

        let unchanged = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn patient_list_returns_exactly_their_own_appointments() {
        let (state, store) = state();
        flow::register_doctor(store.as_ref(), doctor_input("doc")).await.unwrap();
        let alice = flow::register_patient(
            store.as_ref(),
            patient_input("alice"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();
        let bob = flow::register_patient(
            store.as_ref(),
            patient_input("bob"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();
        let doctor_account = store.get_account_by_username("doc").await.unwrap().unwrap();
        let doctor_id =
            store.get_doctor_by_account(doctor_account.id).await.unwrap().unwrap().id;

        for patient_id in [alice.account.id, alice.account.id, bob.account.id] {
            store
                .create_appointment(NewAppointment {
                    patient_id,
                    doctor_id,
                    appointment_datetime: chrono::Utc::now(),
                    reason: None,
                    status: AppointmentStatus::Requested,
                })
                .await
                .unwrap();
        }

        let alice_caller = caller(&store, "alice").await;
        let Json(body) =
            appointments::list(State(state), AuthCaller(alice_caller)).await.unwrap();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        for appointment in data {
            assert_eq!(
                appointment["patient_id"].as_str().unwrap(),
                alice.account.id.to_string()
            );
        }
    }

    #[tokio::test]
    async fn no_csrf_receptionist_failure_surfaces_internal_error_without_orphan() {
        let (state, store) = state();
        store.fail_next_receptionist_insert();

        let err = registration::register_receptionist_no_csrf(
            State(state),
            Json(ReceptionistRegistration {
                username: "rita".to_string(),
                password: "supersecret".to_string(),
                confirm_password: None,
                email: Some("rita@example.com".to_string()),
                first_name: "Rita".to_string(),
                last_name: "Jones".to_string(),
                contact_number: None,
                address: None,
                date_of_birth: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
        assert!(store.get_account_by_username("rita").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_registration_endpoint_requires_admin_role() {
        let (state, store) = state();
        let patient = flow::register_patient(
            store.as_ref(),
            patient_input("alice"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();
        let _ = patient;

        let alice = caller(&store, "alice").await;
        let err = registration::register_doctor_admin(
            State(state),
            AuthCaller(alice),
            Json(doctor_input("sneaky")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(store.get_account_by_username("sneaky").await.unwrap(), None);
    }

    #[tokio::test]
    async fn receptionist_sees_all_bills_but_no_lab_orders() {
        let (state, store) = state();
        flow::register_receptionist(
            store.as_ref(),
            ReceptionistRegistration {
                username: "rita".to_string(),
                password: "supersecret".to_string(),
                confirm_password: None,
                email: Some("rita@example.com".to_string()),
                first_name: "Rita".to_string(),
                last_name: "Jones".to_string(),
                contact_number: None,
                address: None,
                date_of_birth: None,
            },
        )
        .await
        .unwrap();
        flow::register_doctor(store.as_ref(), doctor_input("doc")).await.unwrap();
        let patient = flow::register_patient(
            store.as_ref(),
            patient_input("alice"),
            None,
            LegacyWritePolicy::BestEffort,
        )
        .await
        .unwrap();

        let doc = caller(&store, "doc").await;
        lab_tests::create(
            State(state.clone()),
            AuthCaller(doc),
            Json(lab_tests::CreateLabTestOrderRequest {
                patient_id: patient.account.id,
                doctor_id: None,
                appointment_id: None,
                test_name: "CBC".to_string(),
                results_expected_datetime: None,
                actual_cost: None,
                notes_by_doctor: None,
            }),
        )
        .await
        .unwrap();

        let rita = caller(&store, "rita").await;
        bills::create(
            State(state.clone()),
            AuthCaller(rita.clone()),
            Json(bills::CreateBillRequest {
                patient_id: patient.account.id,
                appointment_id: None,
                amount: 120.0,
                description: "Consultation fee".to_string(),
                due_date: None,
            }),
        )
        .await
        .unwrap();

        let Json(bill_body) =
            bills::list(State(state.clone()), AuthCaller(rita.clone())).await.unwrap();
        assert_eq!(bill_body["data"].as_array().unwrap().len(), 1);

        let Json(lab_body) = lab_tests::list(State(state), AuthCaller(rita)).await.unwrap();
        assert!(lab_body["data"].as_array().unwrap().is_empty());
    }
}
