//! Auth endpoints.
//!
//! - `POST /api/auth/register`: public for patients; an admin bearer token
//!   unlocks doctor and admin accounts
//! - `POST /api/auth/login`, `POST /api/auth/refresh-token`: token pairs
//! - `GET /api/auth/logout`: revoke the presented token, 204
//! - `GET /api/auth/verify-token`: 200 while the token is valid
//! - `PATCH /api/auth/change-password`

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;

use crate::accounts::{self, RegisterRequest};
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::middleware::auth::{authenticate, bearer_token};
use crate::api::types::{created, message, ok, ok_with, ApiContext, ApiResponse, ApiResult, CallerContext};
use crate::auth::{self, ChangePasswordRequest, LoginRequest, RefreshRequest, TokenPair};
use crate::models::enums::UserRole;
use crate::models::Account;

/// `POST /api/auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let caller = match bearer_token(&headers) {
        Some(token) => Some(authenticate(&ctx, token).await?.role),
        None => None,
    };
    let account = ctx
        .with_db(move |conn, _| accounts::register(conn, &req, caller))
        .await?;
    Ok(created("User registered", account))
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<TokenPair> {
    let pair = ctx
        .with_db(move |conn, core| auth::login(conn, core.tokens(), &req))
        .await?;
    Ok(ok_with("Login successful", pair))
}

/// `POST /api/auth/refresh-token`
pub async fn refresh(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<TokenPair> {
    let pair = ctx
        .with_db(move |conn, core| auth::refresh(conn, core.tokens(), &req))
        .await?;
    Ok(ok(pair))
}

/// `GET /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = caller.claims();
    ctx.with_db(move |conn, _| auth::logout(conn, &claims)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct TokenStatus {
    pub valid: bool,
    pub user_id: i64,
    pub role: UserRole,
    pub expires_at: i64,
}

/// `GET /api/auth/verify-token`
pub async fn verify(Extension(caller): Extension<CallerContext>) -> ApiResult<TokenStatus> {
    Ok(ok(TokenStatus {
        valid: true,
        user_id: caller.user_id,
        role: caller.role,
        expires_at: caller.exp,
    }))
}

/// `PATCH /api/auth/change-password`
pub async fn change_password(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    let user_id = caller.user_id;
    ctx.with_db(move |conn, _| auth::change_password(conn, user_id, &req))
        .await?;
    Ok(message("Password updated"))
}
