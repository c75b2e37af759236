//! Medical record endpoints.

use axum::extract::State;
use axum::Extension;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{ok, ok_with, ApiContext, ApiResult, CallerContext};
use crate::authorization;
use crate::models::{MedicalRecord, MedicalRecordDetail};
use crate::records::{self, RecordEditRequest};

/// `GET /api/medical-records`: staff only.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Vec<MedicalRecord>> {
    let caller = caller.caller();
    let list = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            records::list_records(conn)
        })
        .await?;
    Ok(ok(list))
}

/// `GET /api/medical-records/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MedicalRecordDetail> {
    let caller = caller.caller();
    let record = ctx
        .with_db(move |conn, _| {
            authorization::check_record(conn, &caller, id)?;
            records::get_record(conn, id)
        })
        .await?;
    Ok(ok(record))
}

/// `GET /api/medical-records/patient/:id`
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(patient_id): ApiPath<i64>,
) -> ApiResult<MedicalRecordDetail> {
    let caller = caller.caller();
    let record = ctx
        .with_db(move |conn, _| {
            authorization::check_patient(conn, &caller, patient_id)?;
            records::get_record_by_patient(conn, patient_id)
        })
        .await?;
    Ok(ok(record))
}

/// `PATCH /api/medical-records/:id`: staff only.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RecordEditRequest>,
) -> ApiResult<MedicalRecord> {
    let caller = caller.caller();
    let record = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            records::edit_record(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Medical record updated", record))
}
