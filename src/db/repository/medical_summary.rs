use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const SUMMARY_COLUMNS: &str = "id, appointment_id, doctor_id, patient_id, medical_record_id,
     summary_date, diagnosis, treatment, observations, service_type, created_at";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalSummary> {
    Ok(MedicalSummary {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        doctor_id: row.get(2)?,
        patient_id: row.get(3)?,
        medical_record_id: row.get(4)?,
        summary_date: row.get(5)?,
        diagnosis: row.get(6)?,
        treatment: row.get(7)?,
        observations: row.get(8)?,
        service_type: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Links a summary to the parties of its appointment.
#[derive(Debug, Clone, Copy)]
pub struct SummaryLinks {
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub medical_record_id: i64,
}

pub fn insert_summary(
    conn: &Connection,
    links: &SummaryLinks,
    content: &SummaryContent,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_summaries
         (appointment_id, doctor_id, patient_id, medical_record_id,
          summary_date, diagnosis, treatment, observations, service_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            links.appointment_id,
            links.doctor_id,
            links.patient_id,
            links.medical_record_id,
            content.summary_date,
            content.diagnosis,
            content.treatment,
            content.observations,
            content.service_type,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_summary(conn: &Connection, id: i64) -> Result<Option<MedicalSummary>, DatabaseError> {
    let summary = conn
        .query_row(
            &format!("SELECT {SUMMARY_COLUMNS} FROM medical_summaries WHERE id = ?1"),
            params![id],
            summary_from_row,
        )
        .optional()?;
    Ok(summary)
}

fn filter_clauses(filter: &SummaryFilter) -> (Vec<String>, Vec<&dyn ToSql>) {
    let mut clauses = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    for (column, value) in [
        ("patient_id", &filter.patient_id),
        ("doctor_id", &filter.doctor_id),
        ("medical_record_id", &filter.medical_record_id),
        ("appointment_id", &filter.appointment_id),
    ] {
        if let Some(id) = value {
            values.push(id);
            clauses.push(format!("{column} = ?{}", values.len()));
        }
    }
    (clauses, values)
}

/// Summaries matching every set filter field, newest summary date first.
pub fn list_summaries(conn: &Connection, filter: &SummaryFilter) -> Result<Vec<MedicalSummary>, DatabaseError> {
    let (clauses, values) = filter_clauses(filter);

    let mut sql = format!("SELECT {SUMMARY_COLUMNS} FROM medical_summaries");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY summary_date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(values.as_slice(), summary_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_summary_content(
    conn: &Connection,
    id: i64,
    content: &SummaryContent,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medical_summaries
         SET summary_date = ?2, diagnosis = ?3, treatment = ?4, observations = ?5, service_type = ?6
         WHERE id = ?1",
        params![
            id,
            content.summary_date,
            content.diagnosis,
            content.treatment,
            content.observations,
            content.service_type,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MedicalSummary".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_summary(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM medical_summaries WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_summaries(conn: &Connection, filter: &SummaryFilter) -> Result<i64, DatabaseError> {
    let (clauses, values) = filter_clauses(filter);
    let mut sql = String::from("SELECT COUNT(*) FROM medical_summaries");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    let count = conn.query_row(&sql, values.as_slice(), |row| row.get(0))?;
    Ok(count)
}
