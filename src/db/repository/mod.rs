//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection` (or `Transaction`, which
//! derefs to one) so callers decide the transaction boundary. The
//! `require_*` helpers turn a missing row into `DatabaseError::NotFound`.

mod appointment;
mod appointment_option;
mod auth_token;
mod doctor;
mod medical_record;
mod medical_summary;
mod patient;
mod user;

use rusqlite::Connection;

use super::DatabaseError;
use crate::models::*;

pub use appointment::*;
pub use appointment_option::*;
pub use auth_token::*;
pub use doctor::*;
pub use medical_record::*;
pub use medical_summary::*;
pub use patient::*;
pub use user::*;

fn not_found(entity_type: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    }
}

pub fn require_user(conn: &Connection, id: i64) -> Result<User, DatabaseError> {
    get_user(conn, id)?.ok_or_else(|| not_found("User", id))
}

pub fn require_doctor(conn: &Connection, id: i64) -> Result<Doctor, DatabaseError> {
    get_doctor(conn, id)?.ok_or_else(|| not_found("Doctor", id))
}

pub fn require_patient(conn: &Connection, id: i64) -> Result<Patient, DatabaseError> {
    get_patient(conn, id)?.ok_or_else(|| not_found("Patient", id))
}

pub fn require_appointment(conn: &Connection, id: i64) -> Result<Appointment, DatabaseError> {
    get_appointment(conn, id)?.ok_or_else(|| not_found("Appointment", id))
}

pub fn require_option(conn: &Connection, id: i64) -> Result<AppointmentOption, DatabaseError> {
    get_option(conn, id)?.ok_or_else(|| not_found("AppointmentOption", id))
}

pub fn require_medical_record(conn: &Connection, id: i64) -> Result<MedicalRecord, DatabaseError> {
    get_medical_record(conn, id)?.ok_or_else(|| not_found("MedicalRecord", id))
}

pub fn require_summary(conn: &Connection, id: i64) -> Result<MedicalSummary, DatabaseError> {
    get_summary(conn, id)?.ok_or_else(|| not_found("MedicalSummary", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use chrono::NaiveDate;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_user(conn: &Connection, email: &str, national_id: &str, role: UserRole) -> i64 {
        insert_user(
            conn,
            &NewUser {
                first_name: "Laura".into(),
                last_name: "Gomez".into(),
                email: email.into(),
                national_id: national_id.into(),
                password_hash: "hash".into(),
                role,
            },
        )
        .unwrap()
    }

    fn make_patient(conn: &Connection) -> i64 {
        let user_id = make_user(conn, "patient@example.com", "1001", UserRole::Patient);
        let patient_id = insert_patient(
            conn,
            user_id,
            &PatientFields {
                blood_type: "O+",
                address: "Calle 10",
                phone: "3001234567",
                insurance: "Sura",
            },
        )
        .unwrap();
        insert_medical_record(conn, patient_id, None).unwrap();
        patient_id
    }

    fn make_doctor(conn: &Connection) -> i64 {
        let user_id = make_user(conn, "doctor@example.com", "2002", UserRole::Doctor);
        insert_doctor(conn, user_id, "Cardiology", "3109876543").unwrap()
    }

    fn make_appointment(conn: &Connection, patient_id: i64) -> i64 {
        insert_appointment(
            conn,
            &NewAppointment {
                patient_id,
                service_type: "consultation",
                specialty: Some("Cardiology"),
                observations: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn insert_and_get_user() {
        let conn = test_db();
        let id = make_user(&conn, "a@example.com", "1", UserRole::Admin);
        let user = require_user(&conn, id).unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.role, UserRole::Admin);
        assert!(get_user_by_email(&conn, "a@example.com").unwrap().is_some());
        assert!(get_user_by_email(&conn, "b@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_unique_violation() {
        let conn = test_db();
        make_user(&conn, "a@example.com", "1", UserRole::Patient);
        let err = insert_user(
            &conn,
            &NewUser {
                first_name: "Other".into(),
                last_name: "Person".into(),
                email: "a@example.com".into(),
                national_id: "2".into(),
                password_hash: "hash".into(),
                role: UserRole::Patient,
            },
        )
        .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn taken_checks_exclude_self() {
        let conn = test_db();
        let id = make_user(&conn, "a@example.com", "1", UserRole::Patient);
        assert!(email_taken(&conn, "a@example.com", None).unwrap());
        assert!(!email_taken(&conn, "a@example.com", Some(id)).unwrap());
        assert!(national_id_taken(&conn, "1", None).unwrap());
        assert!(!national_id_taken(&conn, "1", Some(id)).unwrap());
    }

    #[test]
    fn list_users_filters_by_role() {
        let conn = test_db();
        make_user(&conn, "a@example.com", "1", UserRole::Admin);
        make_user(&conn, "b@example.com", "2", UserRole::Patient);
        make_user(&conn, "c@example.com", "3", UserRole::Patient);
        let patients = list_users(
            &conn,
            &UserFilter {
                role: Some(UserRole::Patient),
            },
        )
        .unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(list_users(&conn, &UserFilter::default()).unwrap().len(), 3);
        assert_eq!(count_users(&conn).unwrap(), 3);
    }

    #[test]
    fn profiles_join_user() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let doctor_id = make_doctor(&conn);
        let patient = get_patient_profile(&conn, patient_id).unwrap().unwrap();
        assert_eq!(patient.user.email, "patient@example.com");
        assert_eq!(patient.patient.blood_type, "O+");
        let doctor = get_doctor_profile(&conn, doctor_id).unwrap().unwrap();
        assert_eq!(doctor.doctor.specialty, "Cardiology");
        assert_eq!(list_doctor_profiles(&conn).unwrap().len(), 1);
    }

    #[test]
    fn require_missing_returns_not_found() {
        let conn = test_db();
        assert!(matches!(
            require_appointment(&conn, 42),
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            require_summary(&conn, 1),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn new_appointment_starts_requested() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let id = make_appointment(&conn, patient_id);
        let appt = require_appointment(&conn, id).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Requested);
        assert!(appt.doctor_id.is_none());
        assert!(appt.scheduled_date.is_none());
    }

    #[test]
    fn conditional_status_update_checks_source() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let id = make_appointment(&conn, patient_id);

        let moved = update_status_if(
            &conn,
            id,
            &[AppointmentStatus::Requested],
            AppointmentStatus::OptionsProposed,
        )
        .unwrap();
        assert!(moved);

        let again = update_status_if(
            &conn,
            id,
            &[AppointmentStatus::Requested],
            AppointmentStatus::OptionsProposed,
        )
        .unwrap();
        assert!(!again);
    }

    #[test]
    fn assign_writes_schedule() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let doctor_id = make_doctor(&conn);
        let id = make_appointment(&conn, patient_id);

        let assigned = assign_if(
            &conn,
            id,
            &Assignment {
                doctor_id,
                scheduled_date: date(2024, 5, 10),
                estimated_time: Some("09:30".into()),
                observations: None,
            },
            &[AppointmentStatus::Requested, AppointmentStatus::OptionsProposed],
        )
        .unwrap();
        assert!(assigned);

        let appt = require_appointment(&conn, id).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.doctor_id, Some(doctor_id));
        assert_eq!(appt.scheduled_date, Some(date(2024, 5, 10)));
    }

    #[test]
    fn schedule_check_rejects_scheduled_without_doctor() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let id = make_appointment(&conn, patient_id);
        let result = update_status_if(
            &conn,
            id,
            &[AppointmentStatus::Requested],
            AppointmentStatus::Scheduled,
        );
        assert!(result.is_err());
        let appt = require_appointment(&conn, id).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Requested);
    }

    #[test]
    fn delete_guarded_by_status() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let id = make_appointment(&conn, patient_id);
        update_status_if(
            &conn,
            id,
            &[AppointmentStatus::Requested],
            AppointmentStatus::Cancelled,
        )
        .unwrap();

        assert!(!delete_appointment_if(&conn, id, &[AppointmentStatus::Requested]).unwrap());
        assert!(delete_appointment_if(&conn, id, &[AppointmentStatus::Cancelled]).unwrap());
        assert!(get_appointment(&conn, id).unwrap().is_none());
    }

    #[test]
    fn options_listed_in_insert_order_and_cascade() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let doctor_id = make_doctor(&conn);
        let id = make_appointment(&conn, patient_id);

        let ids = insert_options(
            &conn,
            id,
            &[
                NewAppointmentOption {
                    doctor_id,
                    proposed_date: date(2024, 5, 10),
                    estimated_time: Some("09:00".into()),
                },
                NewAppointmentOption {
                    doctor_id,
                    proposed_date: date(2024, 5, 11),
                    estimated_time: None,
                },
            ],
        )
        .unwrap();
        assert_eq!(ids.len(), 2);

        let options = list_options(&conn, id).unwrap();
        assert_eq!(options[0].proposed_date, date(2024, 5, 10));
        assert_eq!(options[1].proposed_date, date(2024, 5, 11));
        assert_eq!(require_option(&conn, ids[1]).unwrap().appointment_id, id);

        assert!(delete_appointment_if(&conn, id, &[AppointmentStatus::Requested]).unwrap());
        assert_eq!(count_options(&conn, id).unwrap(), 0);
    }

    #[test]
    fn list_appointments_by_filter() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let first = make_appointment(&conn, patient_id);
        make_appointment(&conn, patient_id);
        update_status_if(
            &conn,
            first,
            &[AppointmentStatus::Requested],
            AppointmentStatus::Cancelled,
        )
        .unwrap();

        let by_patient = AppointmentFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        };
        assert_eq!(list_appointments(&conn, &by_patient).unwrap().len(), 2);

        let cancelled = AppointmentFilter {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };
        let found = list_appointments(&conn, &cancelled).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, first);

        let clinical = count_appointments_in(
            &conn,
            &by_patient,
            &[AppointmentStatus::Scheduled, AppointmentStatus::Finalized],
        )
        .unwrap();
        assert_eq!(clinical, 0);
        let open = count_appointments_in(
            &conn,
            &by_patient,
            &[AppointmentStatus::Requested, AppointmentStatus::Cancelled],
        )
        .unwrap();
        assert_eq!(open, 2);
        assert_eq!(count_appointments_in(&conn, &cancelled, &[AppointmentStatus::Cancelled]).unwrap(), 1);
        assert_eq!(count_appointments_in(&conn, &by_patient, &[]).unwrap(), 0);
    }

    #[test]
    fn medical_record_one_per_patient() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let record = get_medical_record_by_patient(&conn, patient_id)
            .unwrap()
            .unwrap();
        assert!(insert_medical_record(&conn, patient_id, None)
            .unwrap_err()
            .is_unique_violation());

        update_record_observations(&conn, record.id, Some("Allergic to penicillin")).unwrap();
        let updated = require_medical_record(&conn, record.id).unwrap();
        assert_eq!(updated.observations.as_deref(), Some("Allergic to penicillin"));
    }

    #[test]
    fn summary_filters_and_uniqueness() {
        let conn = test_db();
        let patient_id = make_patient(&conn);
        let doctor_id = make_doctor(&conn);
        let record = get_medical_record_by_patient(&conn, patient_id)
            .unwrap()
            .unwrap();
        let appointment_id = make_appointment(&conn, patient_id);

        let links = SummaryLinks {
            appointment_id,
            doctor_id,
            patient_id,
            medical_record_id: record.id,
        };
        let content = SummaryContent {
            summary_date: date(2024, 5, 10),
            diagnosis: "Hypertension".into(),
            treatment: "Losartan 50mg".into(),
            observations: "Follow up in 3 months".into(),
            service_type: "consultation".into(),
        };
        let id = insert_summary(&conn, &links, &content).unwrap();
        assert!(insert_summary(&conn, &links, &content)
            .unwrap_err()
            .is_unique_violation());

        let by_doctor = SummaryFilter {
            doctor_id: Some(doctor_id),
            ..Default::default()
        };
        assert_eq!(list_summaries(&conn, &by_doctor).unwrap().len(), 1);
        let other_record = SummaryFilter {
            medical_record_id: Some(record.id + 100),
            ..Default::default()
        };
        assert!(list_summaries(&conn, &other_record).unwrap().is_empty());
        assert_eq!(count_summaries(&conn, &by_doctor).unwrap(), 1);
        assert_eq!(count_summaries(&conn, &other_record).unwrap(), 0);
        assert_eq!(count_summaries(&conn, &SummaryFilter::default()).unwrap(), 1);

        assert!(delete_summary(&conn, id).unwrap());
        assert!(!delete_summary(&conn, id).unwrap());
    }

    #[test]
    fn refresh_token_is_single_use() {
        let conn = test_db();
        let user_id = make_user(&conn, "a@example.com", "1", UserRole::Patient);
        insert_refresh_token(&conn, "h1", user_id, 2_000).unwrap();

        assert_eq!(take_refresh_token(&conn, "h1", 1_000).unwrap(), Some(user_id));
        assert_eq!(take_refresh_token(&conn, "h1", 1_000).unwrap(), None);
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let conn = test_db();
        let user_id = make_user(&conn, "a@example.com", "1", UserRole::Patient);
        insert_refresh_token(&conn, "h1", user_id, 500).unwrap();
        assert_eq!(take_refresh_token(&conn, "h1", 1_000).unwrap(), None);
    }

    #[test]
    fn revoked_jti_and_pruning() {
        let conn = test_db();
        revoke_jti(&conn, "jti-1", 100).unwrap();
        revoke_jti(&conn, "jti-1", 100).unwrap();
        revoke_jti(&conn, "jti-2", 5_000).unwrap();
        assert!(is_jti_revoked(&conn, "jti-1").unwrap());

        let removed = prune_expired_tokens(&conn, 1_000).unwrap();
        assert_eq!(removed, 1);
        assert!(!is_jti_revoked(&conn, "jti-1").unwrap());
        assert!(is_jti_revoked(&conn, "jti-2").unwrap());
    }
}
