use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentOption> {
    Ok(AppointmentOption {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        doctor_id: row.get(2)?,
        proposed_date: row.get(3)?,
        estimated_time: row.get(4)?,
    })
}

/// Insert every option for one appointment. Run inside a transaction so a
/// failing row leaves no partial set behind.
pub fn insert_options(
    conn: &Connection,
    appointment_id: i64,
    options: &[NewAppointmentOption],
) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO appointment_options (appointment_id, doctor_id, proposed_date, estimated_time)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut ids = Vec::with_capacity(options.len());
    for option in options {
        stmt.execute(params![
            appointment_id,
            option.doctor_id,
            option.proposed_date,
            option.estimated_time,
        ])?;
        ids.push(conn.last_insert_rowid());
    }
    Ok(ids)
}

pub fn list_options(conn: &Connection, appointment_id: i64) -> Result<Vec<AppointmentOption>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, doctor_id, proposed_date, estimated_time
         FROM appointment_options WHERE appointment_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![appointment_id], option_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_option(conn: &Connection, id: i64) -> Result<Option<AppointmentOption>, DatabaseError> {
    let option = conn
        .query_row(
            "SELECT id, appointment_id, doctor_id, proposed_date, estimated_time
             FROM appointment_options WHERE id = ?1",
            params![id],
            option_from_row,
        )
        .optional()?;
    Ok(option)
}

pub fn count_options(conn: &Connection, appointment_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointment_options WHERE appointment_id = ?1",
        params![appointment_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
