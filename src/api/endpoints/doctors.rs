//! Doctor endpoints. Listings are open to every authenticated caller so
//! patients can see who treats them.

use axum::extract::State;
use axum::Extension;

use crate::accounts::{self, DoctorEditRequest};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{message, ok, ok_with, ApiContext, ApiResult, CallerContext};
use crate::authorization;
use crate::models::DoctorProfile;

/// `GET /api/doctors`
pub async fn list(State(ctx): State<ApiContext>) -> ApiResult<Vec<DoctorProfile>> {
    let doctors = ctx.with_db(|conn, _| accounts::list_doctors(conn)).await?;
    Ok(ok(doctors))
}

/// `GET /api/doctors/:id`
pub async fn get(State(ctx): State<ApiContext>, ApiPath(id): ApiPath<i64>) -> ApiResult<DoctorProfile> {
    let doctor = ctx
        .with_db(move |conn, _| accounts::get_doctor(conn, id))
        .await?;
    Ok(ok(doctor))
}

/// `GET /api/doctors/user/:user_id`
pub async fn by_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<DoctorProfile> {
    let doctor = ctx
        .with_db(move |conn, _| accounts::get_doctor_by_user(conn, user_id))
        .await?;
    Ok(ok(doctor))
}

/// `PATCH /api/doctors/:id`: admin or the doctor themself.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<DoctorEditRequest>,
) -> ApiResult<DoctorProfile> {
    let caller = caller.caller();
    let doctor = ctx
        .with_db(move |conn, _| {
            authorization::check_doctor_self(conn, &caller, id)?;
            accounts::edit_doctor(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Doctor updated", doctor))
}

/// `DELETE /api/doctors/:id`: admin only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let caller = caller.caller();
    ctx.with_db(move |conn, _| {
        caller.require_admin()?;
        accounts::delete_doctor(conn, id)
    })
    .await?;
    Ok(message("Doctor deleted"))
}
