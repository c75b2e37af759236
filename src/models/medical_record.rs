use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::patient::PatientProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub observations: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A record with its patient and summaries, newest summary first.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecordDetail {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub patient: PatientProfile,
    pub summaries: Vec<MedicalSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalSummary {
    pub id: i64,
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub medical_record_id: i64,
    pub summary_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: String,
    pub service_type: String,
    pub created_at: NaiveDateTime,
}

/// Clinical write-up fields of a summary.
#[derive(Debug, Clone)]
pub struct SummaryContent {
    pub summary_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: String,
    pub service_type: String,
}
