//! Role-based access policy.
//!
//! Admins may do everything. Doctors read every clinical entity and drive
//! appointment transitions and summaries. Patients only reach data that
//! hangs off their own patient profile.
//!
//! Checks are default-deny: a patient caller without a patient profile is
//! refused everywhere ownership matters.

use rusqlite::Connection;

use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::UserRole;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// The authenticated user a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: UserRole,
}

/// Roles allowed to read clinical data and drive the lifecycle.
pub const STAFF: [UserRole; 2] = [UserRole::Admin, UserRole::Doctor];

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_staff(&self) -> bool {
        STAFF.contains(&self.role)
    }

    pub fn require(&self, allowed: &[UserRole]) -> ServiceResult<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        tracing::warn!(user_id = self.user_id, role = %self.role, "Access denied by role");
        Err(ServiceError::Forbidden(format!(
            "Role {} is not allowed to perform this action",
            self.role
        )))
    }

    pub fn require_admin(&self) -> ServiceResult<()> {
        self.require(&[UserRole::Admin])
    }

    pub fn require_staff(&self) -> ServiceResult<()> {
        self.require(&STAFF)
    }

    /// Admins, or the user acting on their own account.
    pub fn require_admin_or_self(&self, user_id: i64) -> ServiceResult<()> {
        if self.is_admin() || self.user_id == user_id {
            return Ok(());
        }
        Err(deny(self, "another user's account"))
    }
}

// ═══════════════════════════════════════════════════════════
// Ownership
// ═══════════════════════════════════════════════════════════

/// The caller's own patient id, or `None` for staff (unrestricted).
pub fn patient_scope(conn: &Connection, caller: &Caller) -> ServiceResult<Option<i64>> {
    if caller.is_staff() {
        return Ok(None);
    }
    let patient = db::get_patient_by_user(conn, caller.user_id)?
        .ok_or_else(|| deny(caller, "patient data without a patient profile"))?;
    Ok(Some(patient.id))
}

pub fn check_patient(conn: &Connection, caller: &Caller, patient_id: i64) -> ServiceResult<()> {
    match patient_scope(conn, caller)? {
        Some(own) if own != patient_id => Err(deny(caller, "another patient's data")),
        _ => Ok(()),
    }
}

/// Resolves the appointment first so a missing id is `NotFound` for everyone.
pub fn check_appointment(conn: &Connection, caller: &Caller, appointment_id: i64) -> ServiceResult<()> {
    let appointment = db::require_appointment(conn, appointment_id)?;
    check_patient(conn, caller, appointment.patient_id)
}

pub fn check_record(conn: &Connection, caller: &Caller, record_id: i64) -> ServiceResult<()> {
    let record = db::require_medical_record(conn, record_id)?;
    check_patient(conn, caller, record.patient_id)
}

pub fn check_summary(conn: &Connection, caller: &Caller, summary_id: i64) -> ServiceResult<()> {
    let summary = db::require_summary(conn, summary_id)?;
    check_patient(conn, caller, summary.patient_id)
}

/// Admins, or the doctor editing their own profile.
pub fn check_doctor_self(conn: &Connection, caller: &Caller, doctor_id: i64) -> ServiceResult<()> {
    if caller.is_admin() {
        return Ok(());
    }
    let doctor = db::require_doctor(conn, doctor_id)?;
    caller.require_admin_or_self(doctor.user_id)
}

/// Admins, or the patient editing their own profile.
pub fn check_patient_self(conn: &Connection, caller: &Caller, patient_id: i64) -> ServiceResult<()> {
    if caller.is_admin() {
        return Ok(());
    }
    let patient = db::require_patient(conn, patient_id)?;
    caller.require_admin_or_self(patient.user_id)
}

fn deny(caller: &Caller, what: &str) -> ServiceError {
    tracing::warn!(user_id = caller.user_id, role = %caller.role, what, "Access denied");
    ServiceError::Forbidden(format!("Not allowed to access {what}"))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
