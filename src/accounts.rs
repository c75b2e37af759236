//! Accounts: users and the doctor/patient profiles attached to them.
//!
//! Registration writes the user, its role profile and (for patients) the
//! medical record in one transaction. Deleting a doctor or patient is
//! refused once they have clinical history.

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth;
use crate::db::{self, with_transaction, PatientFields};
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::{AppointmentStatus, UserRole};
use crate::models::*;
use crate::validation;

const CLINICAL: [AppointmentStatus; 2] = [AppointmentStatus::Scheduled, AppointmentStatus::Finalized];

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub password: String,
    pub role: UserRole,
    pub blood_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub insurance: Option<String>,
    pub specialty: Option<String>,
}

/// Identity fields; absent values keep the current ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserEditRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorEditRequest {
    #[serde(flatten)]
    pub user: UserEditRequest,
    pub specialty: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientEditRequest {
    #[serde(flatten)]
    pub user: UserEditRequest,
    pub blood_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub insurance: Option<String>,
}

// ─── Registration ────────────────────────────────────────────────────────────

/// Create an account.
///
/// Patients may self-register. Doctor and admin accounts need an admin
/// `caller`, except the very first account of an empty system, which may
/// be an admin.
pub fn register(conn: &Connection, req: &RegisterRequest, caller: Option<UserRole>) -> ServiceResult<Account> {
    let first_name = validation::text("first_name", &req.first_name, 3, 50)?;
    let last_name = validation::text("last_name", &req.last_name, 3, 99)?;
    let email = validation::email(&req.email)?;
    let national_id = validation::text("national_id", &req.national_id, 1, 30)?;
    validation::password(&req.password)?;

    let field = |name: &str, value: &Option<String>| -> ServiceResult<String> {
        validation::required(name, value.as_deref().unwrap_or_default())
    };
    let patient_fields = match req.role {
        UserRole::Patient => Some((
            field("blood_type", &req.blood_type)?,
            field("address", &req.address)?,
            field("phone", &req.phone)?,
            field("insurance", &req.insurance)?,
        )),
        _ => None,
    };
    let doctor_fields = match req.role {
        UserRole::Doctor => Some((field("specialty", &req.specialty)?, field("phone", &req.phone)?)),
        _ => None,
    };

    let password_hash = auth::hash_password(&req.password)?;

    let account = with_transaction(conn, |tx| -> ServiceResult<Account> {
        let bootstrap = db::count_users(tx)? == 0;
        let allowed = match req.role {
            UserRole::Patient => true,
            UserRole::Admin => bootstrap || caller == Some(UserRole::Admin),
            UserRole::Doctor => caller == Some(UserRole::Admin),
        };
        if !allowed {
            return Err(ServiceError::Forbidden(format!(
                "Only an administrator can create {} accounts",
                req.role
            )));
        }
        ensure_identity_free(tx, &email, Some(&national_id), None)?;

        let user_id = db::insert_user(
            tx,
            &NewUser {
                first_name,
                last_name,
                email,
                national_id,
                password_hash,
                role: req.role,
            },
        )?;

        if let Some((blood_type, address, phone, insurance)) = &patient_fields {
            let patient_id = db::insert_patient(
                tx,
                user_id,
                &PatientFields {
                    blood_type,
                    address,
                    phone,
                    insurance,
                },
            )?;
            db::insert_medical_record(tx, patient_id, None)?;
        }
        if let Some((specialty, phone)) = &doctor_fields {
            db::insert_doctor(tx, user_id, specialty, phone)?;
        }
        account_for(tx, user_id)
    })?;

    tracing::info!(user_id = account.user.id, role = %account.user.role, "Account registered");
    Ok(account)
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// The user with its doctor or patient profile.
pub fn account_for(conn: &Connection, user_id: i64) -> ServiceResult<Account> {
    let user = db::require_user(conn, user_id)?;
    let doctor = match user.role {
        UserRole::Doctor => db::get_doctor_by_user(conn, user_id)?,
        _ => None,
    };
    let patient = match user.role {
        UserRole::Patient => db::get_patient_by_user(conn, user_id)?,
        _ => None,
    };
    Ok(Account {
        user,
        doctor,
        patient,
    })
}

pub fn list_users(conn: &Connection, role: Option<UserRole>) -> ServiceResult<Vec<User>> {
    Ok(db::list_users(conn, &UserFilter { role })?)
}

pub fn edit_user(conn: &Connection, id: i64, req: &UserEditRequest) -> ServiceResult<User> {
    let current = db::require_user(conn, id)?;
    let changes = merge_identity(&current, req)?;
    ensure_identity_free(conn, &changes.email, changes.national_id.as_deref(), Some(id))?;
    db::update_user(conn, id, &changes)?;
    tracing::info!(user_id = id, "User edited");
    Ok(db::require_user(conn, id)?)
}

/// Delete a user; doctors and patients go through their own deletion rules.
pub fn delete_user(conn: &Connection, id: i64) -> ServiceResult<()> {
    let user = db::require_user(conn, id)?;
    match user.role {
        UserRole::Doctor => {
            if let Some(doctor) = db::get_doctor_by_user(conn, id)? {
                return delete_doctor(conn, doctor.id);
            }
        }
        UserRole::Patient => {
            if let Some(patient) = db::get_patient_by_user(conn, id)? {
                return delete_patient(conn, patient.id);
            }
        }
        UserRole::Admin => {}
    }
    with_transaction(conn, |tx| -> ServiceResult<()> {
        db::delete_refresh_tokens_for_user(tx, id)?;
        db::delete_user(tx, id)?;
        Ok(())
    })?;
    tracing::info!(user_id = id, "User deleted");
    Ok(())
}

// ─── Doctors ─────────────────────────────────────────────────────────────────

pub fn list_doctors(conn: &Connection) -> ServiceResult<Vec<DoctorProfile>> {
    Ok(db::list_doctor_profiles(conn)?)
}

pub fn get_doctor(conn: &Connection, id: i64) -> ServiceResult<DoctorProfile> {
    db::get_doctor_profile(conn, id)?.ok_or_else(|| ServiceError::not_found("Doctor", id))
}

pub fn get_doctor_by_user(conn: &Connection, user_id: i64) -> ServiceResult<DoctorProfile> {
    let doctor = db::get_doctor_by_user(conn, user_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("No doctor for user {user_id}")))?;
    get_doctor(conn, doctor.id)
}

pub fn edit_doctor(conn: &Connection, id: i64, req: &DoctorEditRequest) -> ServiceResult<DoctorProfile> {
    let current = get_doctor(conn, id)?;
    let changes = merge_identity(&current.user, &req.user)?;
    let specialty = pick("specialty", req.specialty.as_deref(), &current.doctor.specialty)?;
    let phone = pick("phone", req.phone.as_deref(), &current.doctor.phone)?;

    with_transaction(conn, |tx| -> ServiceResult<()> {
        ensure_identity_free(tx, &changes.email, changes.national_id.as_deref(), Some(current.user.id))?;
        db::update_user(tx, current.user.id, &changes)?;
        db::update_doctor(tx, id, &specialty, &phone)?;
        Ok(())
    })?;
    tracing::info!(doctor_id = id, "Doctor edited");
    get_doctor(conn, id)
}

/// Remove a doctor and its user. Refused while the doctor has scheduled or
/// finalized appointments or summaries; cancelled appointments are detached.
pub fn delete_doctor(conn: &Connection, id: i64) -> ServiceResult<()> {
    with_transaction(conn, |tx| -> ServiceResult<()> {
        let doctor = db::require_doctor(tx, id)?;
        let clinical = db::count_appointments_in(
            tx,
            &AppointmentFilter {
                doctor_id: Some(id),
                ..Default::default()
            },
            &CLINICAL,
        )?;
        let summaries = db::count_summaries(
            tx,
            &SummaryFilter {
                doctor_id: Some(id),
                ..Default::default()
            },
        )?;
        if clinical > 0 || summaries > 0 {
            return Err(ServiceError::Conflict(format!(
                "Doctor {id} has clinical history and cannot be deleted"
            )));
        }
        db::release_doctor_from_appointments(tx, id)?;
        db::delete_doctor(tx, id)?;
        db::delete_refresh_tokens_for_user(tx, doctor.user_id)?;
        db::delete_user(tx, doctor.user_id)?;
        Ok(())
    })?;
    tracing::info!(doctor_id = id, "Doctor deleted");
    Ok(())
}

// ─── Patients ────────────────────────────────────────────────────────────────

pub fn list_patients(conn: &Connection) -> ServiceResult<Vec<PatientProfile>> {
    Ok(db::list_patient_profiles(conn)?)
}

pub fn get_patient(conn: &Connection, id: i64) -> ServiceResult<PatientProfile> {
    db::get_patient_profile(conn, id)?.ok_or_else(|| ServiceError::not_found("Patient", id))
}

pub fn edit_patient(conn: &Connection, id: i64, req: &PatientEditRequest) -> ServiceResult<PatientProfile> {
    let current = get_patient(conn, id)?;
    let changes = merge_identity(&current.user, &req.user)?;
    let p = &current.patient;
    let blood_type = pick("blood_type", req.blood_type.as_deref(), &p.blood_type)?;
    let address = pick("address", req.address.as_deref(), &p.address)?;
    let phone = pick("phone", req.phone.as_deref(), &p.phone)?;
    let insurance = pick("insurance", req.insurance.as_deref(), &p.insurance)?;

    with_transaction(conn, |tx| -> ServiceResult<()> {
        ensure_identity_free(tx, &changes.email, changes.national_id.as_deref(), Some(current.user.id))?;
        db::update_user(tx, current.user.id, &changes)?;
        db::update_patient(
            tx,
            id,
            &PatientFields {
                blood_type: &blood_type,
                address: &address,
                phone: &phone,
                insurance: &insurance,
            },
        )?;
        Ok(())
    })?;
    tracing::info!(patient_id = id, "Patient edited");
    get_patient(conn, id)
}

/// Remove a patient, its record, open appointments and user. Refused while
/// the patient has scheduled or finalized appointments or summaries.
pub fn delete_patient(conn: &Connection, id: i64) -> ServiceResult<()> {
    with_transaction(conn, |tx| -> ServiceResult<()> {
        let patient = db::require_patient(tx, id)?;
        let clinical = db::count_appointments_in(
            tx,
            &AppointmentFilter {
                patient_id: Some(id),
                ..Default::default()
            },
            &CLINICAL,
        )?;
        let summaries = db::count_summaries(
            tx,
            &SummaryFilter {
                patient_id: Some(id),
                ..Default::default()
            },
        )?;
        if clinical > 0 || summaries > 0 {
            return Err(ServiceError::Conflict(format!(
                "Patient {id} has clinical history and cannot be deleted"
            )));
        }
        db::delete_appointments_for_patient(tx, id)?;
        db::delete_medical_record_for_patient(tx, id)?;
        db::delete_patient(tx, id)?;
        db::delete_refresh_tokens_for_user(tx, patient.user_id)?;
        db::delete_user(tx, patient.user_id)?;
        Ok(())
    })?;
    tracing::info!(patient_id = id, "Patient deleted");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn merge_identity(current: &User, req: &UserEditRequest) -> ServiceResult<UserChanges> {
    Ok(UserChanges {
        first_name: match req.first_name.as_deref() {
            Some(v) => validation::text("first_name", v, 3, 50)?,
            None => current.first_name.clone(),
        },
        last_name: match req.last_name.as_deref() {
            Some(v) => validation::text("last_name", v, 3, 99)?,
            None => current.last_name.clone(),
        },
        email: match req.email.as_deref() {
            Some(v) => validation::email(v)?,
            None => current.email.clone(),
        },
        national_id: req
            .national_id
            .as_deref()
            .map(|v| validation::text("national_id", v, 1, 30))
            .transpose()?,
    })
}

fn pick(field: &str, update: Option<&str>, current: &str) -> ServiceResult<String> {
    match update {
        Some(value) => validation::required(field, value),
        None => Ok(current.to_string()),
    }
}

fn ensure_identity_free(
    conn: &Connection,
    email: &str,
    national_id: Option<&str>,
    exclude: Option<i64>,
) -> ServiceResult<()> {
    if db::email_taken(conn, email, exclude)? {
        return Err(ServiceError::Conflict(format!("Email {email} is already registered")));
    }
    if let Some(national_id) = national_id {
        if db::national_id_taken(conn, national_id, exclude)? {
            return Err(ServiceError::Conflict(format!(
                "National id {national_id} is already registered"
            )));
        }
    }
    Ok(())
}
