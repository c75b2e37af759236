//! Appointment lifecycle: Requested → OptionsProposed → Scheduled →
//! Finalized, with Cancelled reachable from any non-terminal status.
//!
//! Every state change goes through [`AppointmentStatus::apply`]. Writes are
//! guarded with conditional updates (`WHERE status IN (...)`) so two
//! concurrent callers can never both move the same appointment; the loser
//! sees zero affected rows and gets `Conflict`.

use rusqlite::Connection;
use serde::Deserialize;

use crate::db::{self, with_transaction, NewAppointment};
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::AppointmentStatus;
use crate::models::*;
use crate::validation;

// ─── Transition table ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentEvent {
    ProposeOptions,
    Assign,
    Finalize,
    Cancel,
    Edit,
    Delete,
}

impl AppointmentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProposeOptions => "propose_options",
            Self::Assign => "assign",
            Self::Finalize => "finalize",
            Self::Cancel => "cancel",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {} an appointment that is {}", .event.as_str(), .from)]
pub struct TransitionError {
    pub from: AppointmentStatus,
    pub event: AppointmentEvent,
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err.event {
            AppointmentEvent::Delete => ServiceError::Forbidden(err.to_string()),
            _ => ServiceError::Conflict(err.to_string()),
        }
    }
}

impl AppointmentStatus {
    /// Next status after `event`, or the reason it is not allowed.
    ///
    /// Edit and Delete leave the status unchanged when permitted.
    pub fn apply(self, event: AppointmentEvent) -> Result<AppointmentStatus, TransitionError> {
        use AppointmentEvent as E;
        use AppointmentStatus as S;

        let next = match (self, event) {
            (S::Requested, E::ProposeOptions) => Some(S::OptionsProposed),
            (S::Requested | S::OptionsProposed, E::Assign) => Some(S::Scheduled),
            (S::Scheduled, E::Finalize) => Some(S::Finalized),
            (S::Requested | S::OptionsProposed | S::Scheduled, E::Cancel) => Some(S::Cancelled),
            (s, E::Edit) if !s.is_terminal() => Some(s),
            (S::Requested | S::OptionsProposed | S::Cancelled, E::Delete) => Some(self),
            _ => None,
        };
        next.ok_or(TransitionError { from: self, event })
    }

    /// Every status from which `event` is accepted.
    pub fn sources(event: AppointmentEvent) -> Vec<AppointmentStatus> {
        AppointmentStatus::ALL
            .into_iter()
            .filter(|s| s.apply(event).is_ok())
            .collect()
    }
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: Option<i64>,
    pub service_type: String,
    pub specialty: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionRequest {
    pub doctor_id: i64,
    pub proposed_date: String,
    pub estimated_time: Option<String>,
}

/// Either an explicit `{doctor_id, scheduled_date}` pair or an `option_id`
/// chosen from the proposed options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignRequest {
    pub doctor_id: Option<i64>,
    pub scheduled_date: Option<String>,
    pub option_id: Option<i64>,
    pub estimated_time: Option<String>,
    pub observations: Option<String>,
}

/// Partial edit: absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentEditRequest {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub service_type: Option<String>,
    pub specialty: Option<String>,
    pub scheduled_date: Option<String>,
    pub estimated_time: Option<String>,
    pub observations: Option<String>,
    pub status: Option<AppointmentStatus>,
}

// ─── Operations ──────────────────────────────────────────────────────────────

pub fn create_appointment(conn: &Connection, patient_id: i64, req: &AppointmentRequest) -> ServiceResult<Appointment> {
    let service_type = validation::required("service_type", &req.service_type)?;
    db::require_patient(conn, patient_id)?;

    let specialty = validation::optional(req.specialty.as_deref());
    let observations = validation::optional(req.observations.as_deref());
    let id = db::insert_appointment(
        conn,
        &NewAppointment {
            patient_id,
            service_type: &service_type,
            specialty: specialty.as_deref(),
            observations: observations.as_deref(),
        },
    )?;
    tracing::info!(appointment_id = id, patient_id, "Appointment requested");
    Ok(db::require_appointment(conn, id)?)
}

pub fn get_appointment(conn: &Connection, id: i64) -> ServiceResult<Appointment> {
    Ok(db::require_appointment(conn, id)?)
}

pub fn get_with_options(conn: &Connection, id: i64) -> ServiceResult<AppointmentWithOptions> {
    let appointment = db::require_appointment(conn, id)?;
    let options = db::list_options(conn, id)?;
    Ok(AppointmentWithOptions { appointment, options })
}

pub fn list_options(conn: &Connection, id: i64) -> ServiceResult<Vec<AppointmentOption>> {
    db::require_appointment(conn, id)?;
    Ok(db::list_options(conn, id)?)
}

pub fn list_appointments(conn: &Connection, filter: &AppointmentFilter) -> ServiceResult<Vec<Appointment>> {
    Ok(db::list_appointments(conn, filter)?)
}

pub fn list_for_doctor(conn: &Connection, doctor_id: i64) -> ServiceResult<Vec<Appointment>> {
    db::require_doctor(conn, doctor_id)?;
    list_appointments(
        conn,
        &AppointmentFilter {
            doctor_id: Some(doctor_id),
            ..Default::default()
        },
    )
}

pub fn list_for_patient(conn: &Connection, patient_id: i64) -> ServiceResult<Vec<Appointment>> {
    db::require_patient(conn, patient_id)?;
    list_appointments(
        conn,
        &AppointmentFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        },
    )
}

/// Persist candidate options and move Requested → OptionsProposed.
///
/// Runs in one transaction: an invalid date or unknown doctor anywhere in
/// the list leaves no option behind and the status untouched.
pub fn propose_options(
    conn: &Connection,
    id: i64,
    options: &[OptionRequest],
) -> ServiceResult<AppointmentWithOptions> {
    if options.is_empty() {
        return Err(ServiceError::InvalidInput(
            "At least one option is required".into(),
        ));
    }

    with_transaction(conn, |tx| -> ServiceResult<AppointmentWithOptions> {
        let appointment = db::require_appointment(tx, id)?;
        let next = checked(&appointment, AppointmentEvent::ProposeOptions)?;

        let mut parsed = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            let proposed_date = validation::date(&format!("options[{i}].proposed_date"), &option.proposed_date)?;
            db::require_doctor(tx, option.doctor_id)?;
            parsed.push(NewAppointmentOption {
                doctor_id: option.doctor_id,
                proposed_date,
                estimated_time: validation::optional(option.estimated_time.as_deref()),
            });
        }

        db::insert_options(tx, id, &parsed)?;
        let sources = AppointmentStatus::sources(AppointmentEvent::ProposeOptions);
        if !db::update_status_if(tx, id, &sources, next)? {
            return Err(lost_race(id, AppointmentEvent::ProposeOptions));
        }
        tracing::info!(
            appointment_id = id,
            from = %appointment.status,
            to = %next,
            count = parsed.len(),
            "Appointment options proposed"
        );

        Ok(AppointmentWithOptions {
            appointment: db::require_appointment(tx, id)?,
            options: db::list_options(tx, id)?,
        })
    })
}

/// Resolve the doctor/date and move the appointment to Scheduled.
pub fn assign_doctor(conn: &Connection, id: i64, req: &AssignRequest) -> ServiceResult<Appointment> {
    let appointment = db::require_appointment(conn, id)?;
    let next = checked(&appointment, AppointmentEvent::Assign)?;

    let (doctor_id, scheduled_date, option_time) = match req.option_id {
        Some(option_id) => {
            let option = db::require_option(conn, option_id)?;
            if option.appointment_id != id {
                return Err(ServiceError::InvalidInput(format!(
                    "Option {option_id} does not belong to appointment {id}"
                )));
            }
            (option.doctor_id, option.proposed_date, option.estimated_time)
        }
        None => {
            let (Some(doctor_id), Some(date)) = (req.doctor_id, req.scheduled_date.as_deref()) else {
                return Err(ServiceError::InvalidInput(
                    "doctor_id and scheduled_date are required (or option_id)".into(),
                ));
            };
            (doctor_id, validation::date("scheduled_date", date)?, None)
        }
    };
    db::require_doctor(conn, doctor_id)?;

    let assignment = Assignment {
        doctor_id,
        scheduled_date,
        estimated_time: validation::optional(req.estimated_time.as_deref()).or(option_time),
        observations: validation::optional(req.observations.as_deref()),
    };
    let sources = AppointmentStatus::sources(AppointmentEvent::Assign);
    if !db::assign_if(conn, id, &assignment, &sources)? {
        return Err(lost_race(id, AppointmentEvent::Assign));
    }
    tracing::info!(
        appointment_id = id,
        doctor_id,
        from = %appointment.status,
        to = %next,
        "Doctor assigned"
    );
    Ok(db::require_appointment(conn, id)?)
}

pub fn finalize(conn: &Connection, id: i64) -> ServiceResult<Appointment> {
    transition(conn, id, AppointmentEvent::Finalize)
}

pub fn cancel(conn: &Connection, id: i64) -> ServiceResult<Appointment> {
    transition(conn, id, AppointmentEvent::Cancel)
}

/// Update fields without touching the status.
///
/// While the appointment is unscheduled it may not carry a doctor or date;
/// once Scheduled both stay present.
pub fn edit_appointment(
    conn: &Connection,
    id: i64,
    req: &AppointmentEditRequest,
) -> ServiceResult<Appointment> {
    if req.status.is_some() {
        return Err(ServiceError::InvalidInput(
            "status cannot be edited directly".into(),
        ));
    }
    let current = db::require_appointment(conn, id)?;
    checked(&current, AppointmentEvent::Edit)?;

    if !current.status.carries_schedule()
        && (req.doctor_id.is_some() || req.scheduled_date.is_some())
    {
        return Err(ServiceError::InvalidInput(
            "doctor_id and scheduled_date can only change once the appointment is scheduled".into(),
        ));
    }

    let patient_id = req.patient_id.unwrap_or(current.patient_id);
    db::require_patient(conn, patient_id)?;
    let doctor_id = req.doctor_id.or(current.doctor_id);
    if let Some(doctor_id) = doctor_id {
        db::require_doctor(conn, doctor_id)?;
    }
    let scheduled_date = match req.scheduled_date.as_deref() {
        Some(date) => Some(validation::date("scheduled_date", date)?),
        None => current.scheduled_date,
    };
    let service_type = match req.service_type.as_deref() {
        Some(value) => validation::required("service_type", value)?,
        None => current.service_type.clone(),
    };

    let edit = AppointmentEdit {
        patient_id,
        doctor_id,
        service_type,
        specialty: merge_text(req.specialty.as_deref(), current.specialty),
        scheduled_date,
        estimated_time: merge_text(req.estimated_time.as_deref(), current.estimated_time),
        observations: merge_text(req.observations.as_deref(), current.observations),
    };
    if !db::update_appointment_if(conn, id, &edit, current.status)? {
        return Err(lost_race(id, AppointmentEvent::Edit));
    }
    tracing::info!(appointment_id = id, status = %current.status, "Appointment edited");
    Ok(db::require_appointment(conn, id)?)
}

/// Remove an appointment and its options. Scheduled and Finalized
/// appointments are part of the clinical history and stay.
pub fn delete_appointment(conn: &Connection, id: i64) -> ServiceResult<()> {
    let appointment = db::require_appointment(conn, id)?;
    checked(&appointment, AppointmentEvent::Delete)?;

    let sources = AppointmentStatus::sources(AppointmentEvent::Delete);
    if !db::delete_appointment_if(conn, id, &sources)? {
        let current = db::require_appointment(conn, id)?;
        return Err(TransitionError {
            from: current.status,
            event: AppointmentEvent::Delete,
        }
        .into());
    }
    tracing::info!(appointment_id = id, status = %appointment.status, "Appointment deleted");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn checked(appointment: &Appointment, event: AppointmentEvent) -> ServiceResult<AppointmentStatus> {
    appointment.status.apply(event).map_err(|err| {
        tracing::warn!(
            appointment_id = appointment.id,
            from = %appointment.status,
            event = event.as_str(),
            "Rejected appointment transition"
        );
        err.into()
    })
}

fn lost_race(id: i64, event: AppointmentEvent) -> ServiceError {
    tracing::warn!(
        appointment_id = id,
        event = event.as_str(),
        "Appointment changed concurrently"
    );
    ServiceError::Conflict(format!(
        "Appointment {id} was modified by another request"
    ))
}

fn transition(conn: &Connection, id: i64, event: AppointmentEvent) -> ServiceResult<Appointment> {
    let appointment = db::require_appointment(conn, id)?;
    let next = checked(&appointment, event)?;

    let sources = AppointmentStatus::sources(event);
    if !db::update_status_if(conn, id, &sources, next)? {
        return Err(lost_race(id, event));
    }
    tracing::info!(
        appointment_id = id,
        from = %appointment.status,
        to = %next,
        "Appointment transition"
    );
    Ok(db::require_appointment(conn, id)?)
}

/// A provided value replaces the current one; blank clears it.
fn merge_text(update: Option<&str>, current: Option<String>) -> Option<String> {
    match update {
        Some(value) => validation::optional(Some(value)),
        None => current,
    }
}
