use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PROFILE_SELECT: &str =
    "SELECT p.id, p.user_id, p.blood_type, p.address, p.phone, p.insurance,
            u.id, u.first_name, u.last_name, u.email, u.national_id, u.password_hash, u.role, u.created_at
     FROM patients p JOIN users u ON u.id = p.user_id";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        user_id: row.get(1)?,
        blood_type: row.get(2)?,
        address: row.get(3)?,
        phone: row.get(4)?,
        insurance: row.get(5)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<PatientProfile> {
    Ok(PatientProfile {
        patient: patient_from_row(row)?,
        user: User {
            id: row.get(6)?,
            first_name: row.get(7)?,
            last_name: row.get(8)?,
            email: row.get(9)?,
            national_id: row.get(10)?,
            password_hash: row.get(11)?,
            role: row.get(12)?,
            created_at: row.get(13)?,
        },
    })
}

/// Patient-specific fields, shared by insert and update.
#[derive(Debug, Clone)]
pub struct PatientFields<'a> {
    pub blood_type: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub insurance: &'a str,
}

pub fn insert_patient(
    conn: &Connection,
    user_id: i64,
    fields: &PatientFields<'_>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (user_id, blood_type, address, phone, insurance)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, fields.blood_type, fields.address, fields.phone, fields.insurance],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, user_id, blood_type, address, phone, insurance FROM patients WHERE id = ?1",
            params![id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn get_patient_by_user(conn: &Connection, user_id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, user_id, blood_type, address, phone, insurance FROM patients WHERE user_id = ?1",
            params![user_id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn get_patient_profile(conn: &Connection, id: i64) -> Result<Option<PatientProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("{PROFILE_SELECT} WHERE p.id = ?1"),
            params![id],
            profile_from_row,
        )
        .optional()?;
    Ok(profile)
}

pub fn list_patient_profiles(conn: &Connection) -> Result<Vec<PatientProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY p.id"))?;
    let rows = stmt.query_map([], profile_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    fields: &PatientFields<'_>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE patients SET blood_type = ?2, address = ?3, phone = ?4, insurance = ?5 WHERE id = ?1",
        params![id, fields.blood_type, fields.address, fields.phone, fields.insurance],
    )?;
    Ok(())
}

pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    Ok(())
}
