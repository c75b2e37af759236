//! Shared types for the API layer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::auth::Claims;
use crate::authorization::Caller;
use crate::core_state::CoreState;
use crate::error::ServiceResult;
use crate::models::enums::UserRole;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run `f` against a fresh connection on the blocking pool.
    ///
    /// SQLite calls block, so they never run on the async executor.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection, &CoreState) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let core = self.core.clone();
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = core.open_db()?;
            Ok(f(&conn, core.as_ref())?)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}

// ═══════════════════════════════════════════════════════════
// Caller context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token checks out.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: i64,
    pub role: UserRole,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl CallerContext {
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            role: self.role,
        }
    }

    pub fn claims(&self) -> Claims {
        Claims {
            sub: self.user_id,
            role: self.role,
            iat: self.iat,
            exp: self.exp,
            jti: self.jti.clone(),
        }
    }
}

impl From<Claims> for CallerContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            jti: claims.jti,
            iat: claims.iat,
            exp: claims.exp,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Success envelope
// ═══════════════════════════════════════════════════════════

/// Success body: `{message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        message: None,
        data: Some(data),
    })
}

pub fn ok_with<T>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        message: Some(message.into()),
        data: Some(data),
    })
}

pub fn message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        message: Some(message.into()),
        data: None,
    })
}

pub fn created<T>(message: impl Into<String>, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok_with(message, data))
}
