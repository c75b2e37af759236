use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, service_type, specialty,
     scheduled_date, estimated_time, observations, status, created_at, updated_at";

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        service_type: row.get(3)?,
        specialty: row.get(4)?,
        scheduled_date: row.get(5)?,
        estimated_time: row.get(6)?,
        observations: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// `?{start}, ?{start+1}, ...` for an IN list of `count` values.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct NewAppointment<'a> {
    pub patient_id: i64,
    pub service_type: &'a str,
    pub specialty: Option<&'a str>,
    pub observations: Option<&'a str>,
}

pub fn insert_appointment(conn: &Connection, new: &NewAppointment<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (patient_id, service_type, specialty, observations, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.patient_id,
            new.service_type,
            new.specialty,
            new.observations,
            AppointmentStatus::Requested,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let appointment = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            appointment_from_row,
        )
        .optional()?;
    Ok(appointment)
}

/// `AND`-joined predicates for every set filter field, numbered from `?1`.
fn filter_clauses(filter: &AppointmentFilter) -> (Vec<String>, Vec<&dyn ToSql>) {
    let mut clauses = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    if let Some(patient_id) = &filter.patient_id {
        values.push(patient_id);
        clauses.push(format!("patient_id = ?{}", values.len()));
    }
    if let Some(doctor_id) = &filter.doctor_id {
        values.push(doctor_id);
        clauses.push(format!("doctor_id = ?{}", values.len()));
    }
    if let Some(status) = &filter.status {
        values.push(status);
        clauses.push(format!("status = ?{}", values.len()));
    }
    (clauses, values)
}

pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let (clauses, values) = filter_clauses(filter);

    let mut sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(values.as_slice(), appointment_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Set `status = to` only if the current status is one of `from`.
///
/// Returns `false` when no row matched, i.e. the appointment is missing or
/// another writer moved it out of `from` first.
pub fn update_status_if(
    conn: &Connection,
    id: i64,
    from: &[AppointmentStatus],
    to: AppointmentStatus,
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "UPDATE appointments SET status = ?1, updated_at = datetime('now')
         WHERE id = ?2 AND status IN ({})",
        placeholders(3, from.len())
    );
    let mut values: Vec<&dyn ToSql> = vec![&to, &id];
    values.extend(from.iter().map(|s| s as &dyn ToSql));
    let updated = conn.execute(&sql, values.as_slice())?;
    Ok(updated > 0)
}

/// Write the doctor/date assignment and move to Scheduled, guarded on `from`.
pub fn assign_if(
    conn: &Connection,
    id: i64,
    assignment: &Assignment,
    from: &[AppointmentStatus],
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "UPDATE appointments
         SET doctor_id = ?1, scheduled_date = ?2, estimated_time = ?3,
             observations = COALESCE(?4, observations), status = ?5,
             updated_at = datetime('now')
         WHERE id = ?6 AND status IN ({})",
        placeholders(7, from.len())
    );
    let scheduled = AppointmentStatus::Scheduled;
    let mut values: Vec<&dyn ToSql> = vec![
        &assignment.doctor_id,
        &assignment.scheduled_date,
        &assignment.estimated_time,
        &assignment.observations,
        &scheduled,
        &id,
    ];
    values.extend(from.iter().map(|s| s as &dyn ToSql));
    let updated = conn.execute(&sql, values.as_slice())?;
    Ok(updated > 0)
}

/// Overwrite the editable fields, guarded on the status the edit was validated against.
pub fn update_appointment_if(
    conn: &Connection,
    id: i64,
    edit: &AppointmentEdit,
    expected: AppointmentStatus,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments
         SET patient_id = ?1, doctor_id = ?2, service_type = ?3, specialty = ?4,
             scheduled_date = ?5, estimated_time = ?6, observations = ?7,
             updated_at = datetime('now')
         WHERE id = ?8 AND status = ?9",
        params![
            edit.patient_id,
            edit.doctor_id,
            edit.service_type,
            edit.specialty,
            edit.scheduled_date,
            edit.estimated_time,
            edit.observations,
            id,
            expected,
        ],
    )?;
    Ok(updated > 0)
}

/// Delete the appointment only while its status is one of `allowed`.
pub fn delete_appointment_if(
    conn: &Connection,
    id: i64,
    allowed: &[AppointmentStatus],
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "DELETE FROM appointments WHERE id = ?1 AND status IN ({})",
        placeholders(2, allowed.len())
    );
    let mut values: Vec<&dyn ToSql> = vec![&id];
    values.extend(allowed.iter().map(|s| s as &dyn ToSql));
    let deleted = conn.execute(&sql, values.as_slice())?;
    Ok(deleted > 0)
}

/// Count appointments matching `filter` whose status is one of `statuses`.
pub fn count_appointments_in(
    conn: &Connection,
    filter: &AppointmentFilter,
    statuses: &[AppointmentStatus],
) -> Result<i64, DatabaseError> {
    if statuses.is_empty() {
        return Ok(0);
    }
    let (mut clauses, mut values) = filter_clauses(filter);
    clauses.push(format!(
        "status IN ({})",
        placeholders(values.len() + 1, statuses.len())
    ));
    values.extend(statuses.iter().map(|s| s as &dyn ToSql));

    let sql = format!(
        "SELECT COUNT(*) FROM appointments WHERE {}",
        clauses.join(" AND ")
    );
    let count = conn.query_row(&sql, values.as_slice(), |row| row.get(0))?;
    Ok(count)
}

/// Remove every appointment of a patient. Callers check clinical history first.
pub fn delete_appointments_for_patient(conn: &Connection, patient_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(deleted)
}

/// Detach a doctor from appointments that never reached scheduling.
pub fn release_doctor_from_appointments(conn: &Connection, doctor_id: i64) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET doctor_id = NULL, updated_at = datetime('now')
         WHERE doctor_id = ?1",
        params![doctor_id],
    )?;
    Ok(updated)
}
