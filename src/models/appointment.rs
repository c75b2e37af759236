use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub service_type: String,
    pub specialty: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub observations: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A candidate (date, doctor) pair proposed for a requested appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentOption {
    pub id: i64,
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub proposed_date: NaiveDate,
    pub estimated_time: Option<String>,
}

/// Option payload before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointmentOption {
    pub doctor_id: i64,
    pub proposed_date: NaiveDate,
    pub estimated_time: Option<String>,
}

/// Scheduling fields written when a doctor is assigned.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub doctor_id: i64,
    pub scheduled_date: NaiveDate,
    pub estimated_time: Option<String>,
    pub observations: Option<String>,
}

/// Field-level edit of an appointment. Status is never part of an edit.
#[derive(Debug, Clone)]
pub struct AppointmentEdit {
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub service_type: String,
    pub specialty: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub observations: Option<String>,
}

/// An appointment together with the options proposed for it.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithOptions {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub options: Vec<AppointmentOption>,
}
