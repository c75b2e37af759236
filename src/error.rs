//! Domain error taxonomy shared by every service module.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        ServiceError::NotFound(format!("{entity} {id} not found"))
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return ServiceError::Conflict("Resource already exists".into());
        }
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ServiceError::NotFound(format!("{entity_type} {id} not found"))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
