//! Patient endpoints.

use axum::extract::State;
use axum::Extension;

use crate::accounts::{self, PatientEditRequest};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{message, ok, ok_with, ApiContext, ApiResult, CallerContext};
use crate::authorization;
use crate::models::PatientProfile;

/// `GET /api/patients`: staff only.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Vec<PatientProfile>> {
    let caller = caller.caller();
    let patients = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            accounts::list_patients(conn)
        })
        .await?;
    Ok(ok(patients))
}

/// `GET /api/patients/:id`: staff, or the patient themself.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<PatientProfile> {
    let caller = caller.caller();
    let patient = ctx
        .with_db(move |conn, _| {
            let patient = accounts::get_patient(conn, id)?;
            authorization::check_patient(conn, &caller, id)?;
            Ok(patient)
        })
        .await?;
    Ok(ok(patient))
}

/// `PATCH /api/patients/:id`: admin, or the patient themself.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<PatientEditRequest>,
) -> ApiResult<PatientProfile> {
    let caller = caller.caller();
    let patient = ctx
        .with_db(move |conn, _| {
            authorization::check_patient_self(conn, &caller, id)?;
            accounts::edit_patient(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Patient updated", patient))
}

/// `DELETE /api/patients/:id`: admin only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let caller = caller.caller();
    ctx.with_db(move |conn, _| {
        caller.require_admin()?;
        accounts::delete_patient(conn, id)
    })
    .await?;
    Ok(message("Patient deleted"))
}
