//! Medical records (one per patient) and the visit summaries that
//! accumulate on them.
//!
//! Writing a summary is what closes a Scheduled appointment: the insert and
//! the Scheduled → Finalized flip share one transaction. Appointments
//! finalized beforehand still accept their single summary.

use rusqlite::Connection;
use serde::Deserialize;

use crate::appointment::AppointmentEvent;
use crate::db::{self, with_transaction, SummaryLinks};
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::AppointmentStatus;
use crate::models::*;
use crate::validation;

// ── Records ──

pub fn list_records(conn: &Connection) -> ServiceResult<Vec<MedicalRecord>> {
    Ok(db::list_medical_records(conn)?)
}

/// Record with its patient and summaries, newest summary first.
pub fn get_record(conn: &Connection, id: i64) -> ServiceResult<MedicalRecordDetail> {
    let record = db::require_medical_record(conn, id)?;
    detail(conn, record)
}

pub fn get_record_by_patient(conn: &Connection, patient_id: i64) -> ServiceResult<MedicalRecordDetail> {
    db::require_patient(conn, patient_id)?;
    let record = db::get_medical_record_by_patient(conn, patient_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("No medical record for patient {patient_id}")))?;
    detail(conn, record)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordEditRequest {
    pub observations: Option<String>,
}

pub fn edit_record(conn: &Connection, id: i64, req: &RecordEditRequest) -> ServiceResult<MedicalRecord> {
    db::require_medical_record(conn, id)?;
    let observations = validation::optional(req.observations.as_deref());
    db::update_record_observations(conn, id, observations.as_deref())?;
    tracing::info!(medical_record_id = id, "Medical record observations updated");
    Ok(db::require_medical_record(conn, id)?)
}

fn detail(conn: &Connection, record: MedicalRecord) -> ServiceResult<MedicalRecordDetail> {
    let patient = db::get_patient_profile(conn, record.patient_id)?
        .ok_or_else(|| ServiceError::not_found("Patient", record.patient_id))?;
    let summaries = db::list_summaries(
        conn,
        &SummaryFilter {
            medical_record_id: Some(record.id),
            ..Default::default()
        },
    )?;
    Ok(MedicalRecordDetail {
        record,
        patient,
        summaries,
    })
}

// ── Summaries ──

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub appointment_id: i64,
    pub summary_date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: String,
    /// Defaults to the appointment's service type.
    pub service_type: Option<String>,
}

/// Partial edit of the clinical fields. The appointment link never changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryEditRequest {
    pub summary_date: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub observations: Option<String>,
    pub service_type: Option<String>,
    pub appointment_id: Option<i64>,
}

/// Parent entity a summary listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOwner {
    Patient,
    Doctor,
    Record,
    Appointment,
}

pub fn list_summaries(conn: &Connection) -> ServiceResult<Vec<MedicalSummary>> {
    Ok(db::list_summaries(conn, &SummaryFilter::default())?)
}

pub fn get_summary(conn: &Connection, id: i64) -> ServiceResult<MedicalSummary> {
    Ok(db::require_summary(conn, id)?)
}

/// Summaries of one parent; the parent must exist.
pub fn summaries_for(conn: &Connection, owner: SummaryOwner, id: i64) -> ServiceResult<Vec<MedicalSummary>> {
    let mut filter = SummaryFilter::default();
    match owner {
        SummaryOwner::Patient => {
            db::require_patient(conn, id)?;
            filter.patient_id = Some(id);
        }
        SummaryOwner::Doctor => {
            db::require_doctor(conn, id)?;
            filter.doctor_id = Some(id);
        }
        SummaryOwner::Record => {
            db::require_medical_record(conn, id)?;
            filter.medical_record_id = Some(id);
        }
        SummaryOwner::Appointment => {
            db::require_appointment(conn, id)?;
            filter.appointment_id = Some(id);
        }
    }
    Ok(db::list_summaries(conn, &filter)?)
}

/// Write the summary for an appointment and finalize it.
///
/// A Scheduled appointment moves to Finalized in the same transaction. One
/// already Finalized keeps its status. Every appointment holds at most one
/// summary.
pub fn create_summary(conn: &Connection, req: &SummaryRequest) -> ServiceResult<MedicalSummary> {
    let summary_date = validation::date("summary_date", &req.summary_date)?;
    let diagnosis = validation::required("diagnosis", &req.diagnosis)?;
    let treatment = validation::required("treatment", &req.treatment)?;
    let observations = validation::required("observations", &req.observations)?;

    with_transaction(conn, |tx| -> ServiceResult<MedicalSummary> {
        let appointment = db::require_appointment(tx, req.appointment_id)?;
        let by_appointment = SummaryFilter {
            appointment_id: Some(appointment.id),
            ..Default::default()
        };
        if db::count_summaries(tx, &by_appointment)? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Appointment {} already has a summary",
                appointment.id
            )));
        }
        // Finalized through the lifecycle endpoint: the summary is written
        // without another status change.
        let next = match appointment.status {
            AppointmentStatus::Finalized => None,
            status => Some(status.apply(AppointmentEvent::Finalize).map_err(|err| {
                tracing::warn!(
                    appointment_id = appointment.id,
                    from = %status,
                    "Summary rejected: appointment is not scheduled"
                );
                ServiceError::Conflict(format!(
                    "A summary requires a scheduled or finalized appointment ({err})"
                ))
            })?),
        };
        let doctor_id = appointment.doctor_id.ok_or_else(|| {
            ServiceError::Conflict(format!("Appointment {} has no doctor", appointment.id))
        })?;

        let record = match db::get_medical_record_by_patient(tx, appointment.patient_id)? {
            Some(record) => record,
            None => {
                let id = db::insert_medical_record(tx, appointment.patient_id, None)?;
                db::require_medical_record(tx, id)?
            }
        };

        let service_type = match req.service_type.as_deref() {
            Some(value) => validation::required("service_type", value)?,
            None => appointment.service_type.clone(),
        };
        let content = SummaryContent {
            summary_date,
            diagnosis,
            treatment,
            observations,
            service_type,
        };
        let links = SummaryLinks {
            appointment_id: appointment.id,
            doctor_id,
            patient_id: appointment.patient_id,
            medical_record_id: record.id,
        };
        let id = db::insert_summary(tx, &links, &content)?;

        match next {
            Some(next) => {
                if !db::update_status_if(tx, appointment.id, &[AppointmentStatus::Scheduled], next)? {
                    return Err(ServiceError::Conflict(format!(
                        "Appointment {} was modified by another request",
                        appointment.id
                    )));
                }
                tracing::info!(
                    summary_id = id,
                    appointment_id = appointment.id,
                    from = %appointment.status,
                    to = %next,
                    "Medical summary created, appointment finalized"
                );
            }
            None => tracing::info!(
                summary_id = id,
                appointment_id = appointment.id,
                "Medical summary created for finalized appointment"
            ),
        }
        Ok(db::require_summary(tx, id)?)
    })
}

pub fn edit_summary(conn: &Connection, id: i64, req: &SummaryEditRequest) -> ServiceResult<MedicalSummary> {
    let current = db::require_summary(conn, id)?;
    if req
        .appointment_id
        .is_some_and(|appointment_id| appointment_id != current.appointment_id)
    {
        return Err(ServiceError::InvalidInput(
            "A summary cannot be moved to another appointment".into(),
        ));
    }

    let pick = |field: &str, update: Option<&str>, current: String| -> ServiceResult<String> {
        match update {
            Some(value) => validation::required(field, value),
            None => Ok(current),
        }
    };
    let content = SummaryContent {
        summary_date: match req.summary_date.as_deref() {
            Some(value) => validation::date("summary_date", value)?,
            None => current.summary_date,
        },
        diagnosis: pick("diagnosis", req.diagnosis.as_deref(), current.diagnosis)?,
        treatment: pick("treatment", req.treatment.as_deref(), current.treatment)?,
        observations: pick("observations", req.observations.as_deref(), current.observations)?,
        service_type: pick("service_type", req.service_type.as_deref(), current.service_type)?,
    };
    db::update_summary_content(conn, id, &content)?;
    tracing::info!(summary_id = id, "Medical summary edited");
    Ok(db::require_summary(conn, id)?)
}

/// Remove a summary. Its appointment stays Finalized.
pub fn delete_summary(conn: &Connection, id: i64) -> ServiceResult<()> {
    if !db::delete_summary(conn, id)? {
        return Err(ServiceError::not_found("MedicalSummary", id));
    }
    tracing::info!(summary_id = id, "Medical summary deleted");
    Ok(())
}
