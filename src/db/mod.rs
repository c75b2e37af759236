pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl DatabaseError {
    /// True when SQLite rejected the write because of a UNIQUE index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            DatabaseError::ConstraintViolation(_) => true,
            _ => false,
        }
    }
}

/// Run `f` inside an immediate transaction.
///
/// Commits when `f` returns `Ok`, rolls back (on drop) otherwise. The
/// immediate behavior takes the write lock up front so a read-then-write
/// sequence inside `f` cannot be interleaved with another writer.
pub fn with_transaction<T, E, F>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<DatabaseError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    let value = f(&tx)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(value)
}
