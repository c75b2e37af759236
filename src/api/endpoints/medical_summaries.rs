//! Medical summary endpoints. Writing a summary finalizes its appointment.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{created, message, ok, ok_with, ApiContext, ApiResponse, ApiResult, CallerContext};
use crate::authorization::{self, Caller};
use crate::error::ServiceResult;
use crate::models::MedicalSummary;
use crate::records::{self, SummaryEditRequest, SummaryOwner, SummaryRequest};

/// `GET /api/medical-summaries`: staff only.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Vec<MedicalSummary>> {
    let caller = caller.caller();
    let summaries = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            records::list_summaries(conn)
        })
        .await?;
    Ok(ok(summaries))
}

/// `POST /api/medical-summaries`: staff only.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(req): ApiJson<SummaryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MedicalSummary>>), ApiError> {
    let caller = caller.caller();
    let summary = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            records::create_summary(conn, &req)
        })
        .await?;
    Ok(created("Medical summary created", summary))
}

/// `GET /api/medical-summaries/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MedicalSummary> {
    let caller = caller.caller();
    let summary = ctx
        .with_db(move |conn, _| {
            authorization::check_summary(conn, &caller, id)?;
            records::get_summary(conn, id)
        })
        .await?;
    Ok(ok(summary))
}

/// `PATCH /api/medical-summaries/:id`: staff only.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<SummaryEditRequest>,
) -> ApiResult<MedicalSummary> {
    let caller = caller.caller();
    let summary = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            records::edit_summary(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Medical summary updated", summary))
}

/// `DELETE /api/medical-summaries/:id`: admin only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let caller = caller.caller();
    ctx.with_db(move |conn, _| {
        caller.require_admin()?;
        records::delete_summary(conn, id)
    })
    .await?;
    Ok(message("Medical summary deleted"))
}

// ── Filters ──

pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<MedicalSummary>> {
    scoped(ctx, caller.caller(), SummaryOwner::Patient, id).await
}

pub async fn by_doctor(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<MedicalSummary>> {
    scoped(ctx, caller.caller(), SummaryOwner::Doctor, id).await
}

pub async fn by_record(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<MedicalSummary>> {
    scoped(ctx, caller.caller(), SummaryOwner::Record, id).await
}

pub async fn by_appointment(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<MedicalSummary>> {
    scoped(ctx, caller.caller(), SummaryOwner::Appointment, id).await
}

async fn scoped(ctx: ApiContext, caller: Caller, owner: SummaryOwner, id: i64) -> ApiResult<Vec<MedicalSummary>> {
    let summaries = ctx
        .with_db(move |conn, _| -> ServiceResult<Vec<MedicalSummary>> {
            match owner {
                SummaryOwner::Patient => authorization::check_patient(conn, &caller, id)?,
                SummaryOwner::Doctor => caller.require_staff()?,
                SummaryOwner::Record => authorization::check_record(conn, &caller, id)?,
                SummaryOwner::Appointment => authorization::check_appointment(conn, &caller, id)?,
            }
            records::summaries_for(conn, owner, id)
        })
        .await?;
    Ok(ok(summaries))
}
