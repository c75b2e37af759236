//! User endpoints.

use axum::extract::State;
use axum::Extension;

use crate::accounts::{self, UserEditRequest};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{message, ok, ok_with, ApiContext, ApiResult, CallerContext};
use crate::models::enums::UserRole;
use crate::models::{Account, User};

/// `GET /api/users/current`: the caller with its role profile.
pub async fn current(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Account> {
    let user_id = caller.user_id;
    let account = ctx
        .with_db(move |conn, _| accounts::account_for(conn, user_id))
        .await?;
    Ok(ok(account))
}

/// `GET /api/users/role/:role`: admin only.
pub async fn by_role(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(role): ApiPath<UserRole>,
) -> ApiResult<Vec<User>> {
    let caller = caller.caller();
    let users = ctx
        .with_db(move |conn, _| {
            caller.require_admin()?;
            accounts::list_users(conn, Some(role))
        })
        .await?;
    Ok(ok(users))
}

/// `GET /api/users/:id`: admin or self.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Account> {
    let caller = caller.caller();
    let account = ctx
        .with_db(move |conn, _| {
            caller.require_admin_or_self(id)?;
            accounts::account_for(conn, id)
        })
        .await?;
    Ok(ok(account))
}

/// `PATCH /api/users/:id`: admin or self.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UserEditRequest>,
) -> ApiResult<User> {
    let caller = caller.caller();
    let user = ctx
        .with_db(move |conn, _| {
            caller.require_admin_or_self(id)?;
            accounts::edit_user(conn, id, &req)
        })
        .await?;
    Ok(ok_with("User updated", user))
}

/// `DELETE /api/users/:id`: admin only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let caller = caller.caller();
    ctx.with_db(move |conn, _| {
        caller.require_admin()?;
        accounts::delete_user(conn, id)
    })
    .await?;
    Ok(message("User deleted"))
}
