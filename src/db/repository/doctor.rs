use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PROFILE_SELECT: &str =
    "SELECT d.id, d.user_id, d.specialty, d.phone,
            u.id, u.first_name, u.last_name, u.email, u.national_id, u.password_hash, u.role, u.created_at
     FROM doctors d JOIN users u ON u.id = d.user_id";

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        user_id: row.get(1)?,
        specialty: row.get(2)?,
        phone: row.get(3)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<DoctorProfile> {
    Ok(DoctorProfile {
        doctor: doctor_from_row(row)?,
        user: User {
            id: row.get(4)?,
            first_name: row.get(5)?,
            last_name: row.get(6)?,
            email: row.get(7)?,
            national_id: row.get(8)?,
            password_hash: row.get(9)?,
            role: row.get(10)?,
            created_at: row.get(11)?,
        },
    })
}

pub fn insert_doctor(
    conn: &Connection,
    user_id: i64,
    specialty: &str,
    phone: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (user_id, specialty, phone) VALUES (?1, ?2, ?3)",
        params![user_id, specialty, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            "SELECT id, user_id, specialty, phone FROM doctors WHERE id = ?1",
            params![id],
            doctor_from_row,
        )
        .optional()?;
    Ok(doctor)
}

pub fn get_doctor_by_user(conn: &Connection, user_id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            "SELECT id, user_id, specialty, phone FROM doctors WHERE user_id = ?1",
            params![user_id],
            doctor_from_row,
        )
        .optional()?;
    Ok(doctor)
}

pub fn get_doctor_profile(conn: &Connection, id: i64) -> Result<Option<DoctorProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("{PROFILE_SELECT} WHERE d.id = ?1"),
            params![id],
            profile_from_row,
        )
        .optional()?;
    Ok(profile)
}

pub fn list_doctor_profiles(conn: &Connection) -> Result<Vec<DoctorProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY d.id"))?;
    let rows = stmt.query_map([], profile_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_doctor(
    conn: &Connection,
    id: i64,
    specialty: &str,
    phone: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE doctors SET specialty = ?2, phone = ?3 WHERE id = ?1",
        params![id, specialty, phone],
    )?;
    Ok(())
}

pub fn delete_doctor(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    Ok(())
}
