//! Application state shared by every request handler.
//!
//! Holds only immutable configuration. Each request opens its own SQLite
//! connection; `busy_timeout` makes concurrent writers queue instead of
//! failing.

use std::path::Path;

use crate::auth::TokenSettings;
use crate::config::AppConfig;
use crate::db::{self, DatabaseError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct CoreState {
    pub config: AppConfig,
    tokens: TokenSettings,
}

impl CoreState {
    pub fn new(config: AppConfig) -> Self {
        let tokens = TokenSettings::from_config(&config);
        Self { config, tokens }
    }

    /// Create the database directory and apply migrations once at startup.
    pub fn prepare_storage(&self) -> Result<(), CoreError> {
        if let Some(parent) = self.db_path().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::DataDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = self.open_db()?;
        tracing::info!(
            path = %self.db_path().display(),
            tables = db::count_tables(&conn)?,
            "Database ready"
        );
        Ok(())
    }

    /// Open a connection for one unit of work.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        Ok(db::open_database(self.db_path())?)
    }

    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }

    pub fn tokens(&self) -> &TokenSettings {
        &self.tokens
    }
}
