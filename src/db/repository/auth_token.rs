use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;

/// Store a refresh token by its SHA-256 hash. Expiry is unix seconds.
pub fn insert_refresh_token(
    conn: &Connection,
    token_hash: &str,
    user_id: i64,
    expires_at: i64,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token_hash, user_id, expires_at],
    )?;
    Ok(())
}

/// Remove and return the owner of a refresh token that is still valid at `now`.
///
/// Single use: a second call with the same hash returns `None`.
pub fn take_refresh_token(
    conn: &Connection,
    token_hash: &str,
    now: i64,
) -> Result<Option<i64>, DatabaseError> {
    let found: Option<(i64, i64)> = conn
        .query_row(
            "SELECT user_id, expires_at FROM refresh_tokens WHERE token_hash = ?1",
            params![token_hash],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    conn.execute(
        "DELETE FROM refresh_tokens WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(found.and_then(|(user_id, expires_at)| (expires_at > now).then_some(user_id)))
}

pub fn delete_refresh_tokens_for_user(conn: &Connection, user_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM refresh_tokens WHERE user_id = ?1",
        params![user_id],
    )?;
    Ok(deleted)
}

/// Deny-list an access token id until its own expiry.
pub fn revoke_jti(conn: &Connection, jti: &str, expires_at: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?1, ?2)",
        params![jti, expires_at],
    )?;
    Ok(())
}

pub fn is_jti_revoked(conn: &Connection, jti: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?1",
        params![jti],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Drop expired refresh tokens and deny-list entries. Returns rows removed.
pub fn prune_expired_tokens(conn: &Connection, now: i64) -> Result<usize, DatabaseError> {
    let refresh = conn.execute(
        "DELETE FROM refresh_tokens WHERE expires_at <= ?1",
        params![now],
    )?;
    let revoked = conn.execute(
        "DELETE FROM revoked_tokens WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(refresh + revoked)
}
