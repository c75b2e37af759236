use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const RECORD_COLUMNS: &str = "id, patient_id, observations, created_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        observations: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn insert_medical_record(
    conn: &Connection,
    patient_id: i64,
    observations: Option<&str>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_records (patient_id, observations) VALUES (?1, ?2)",
        params![patient_id, observations],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medical_record(conn: &Connection, id: i64) -> Result<Option<MedicalRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM medical_records WHERE id = ?1"),
            params![id],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

pub fn get_medical_record_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<MedicalRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM medical_records WHERE patient_id = ?1"),
            params![patient_id],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

pub fn list_medical_records(conn: &Connection) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records ORDER BY id"
    ))?;
    let rows = stmt.query_map([], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_record_observations(
    conn: &Connection,
    id: i64,
    observations: Option<&str>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medical_records SET observations = ?2 WHERE id = ?1",
        params![id, observations],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MedicalRecord".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_medical_record_for_patient(conn: &Connection, patient_id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM medical_records WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(())
}
