use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, national_id, password_hash, role, created_at";

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        national_id: row.get(4)?,
        password_hash: row.get(5)?,
        role: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, national_id, password_hash, role)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.first_name,
            user.last_name,
            user.email,
            user.national_id,
            user.password_hash,
            user.role,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
    let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
    let mut values: Vec<&dyn ToSql> = Vec::new();
    if let Some(role) = &filter.role {
        sql.push_str(" WHERE role = ?1");
        values.push(role);
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(values.as_slice(), user_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_users(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

/// Whether another user (other than `exclude`) already owns this email.
pub fn email_taken(
    conn: &Connection,
    email: &str,
    exclude: Option<i64>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1 AND (?2 IS NULL OR id != ?2)",
        params![email, exclude],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Whether another user (other than `exclude`) already owns this national id.
pub fn national_id_taken(
    conn: &Connection,
    national_id: &str,
    exclude: Option<i64>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE national_id = ?1 AND (?2 IS NULL OR id != ?2)",
        params![national_id, exclude],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_user(conn: &Connection, id: i64, changes: &UserChanges) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE users SET first_name = ?2, last_name = ?3, email = ?4,
         national_id = COALESCE(?5, national_id)
         WHERE id = ?1",
        params![
            id,
            changes.first_name,
            changes.last_name,
            changes.email,
            changes.national_id,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn update_password_hash(
    conn: &Connection,
    id: i64,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE users SET password_hash = ?2 WHERE id = ?1",
        params![id, password_hash],
    )?;
    Ok(())
}

pub fn delete_user(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(())
}
