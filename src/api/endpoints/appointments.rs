//! Appointment endpoints.
//!
//! Patients see and request only their own appointments, may cancel them
//! and may pick one of the proposed options. Everything else in the
//! lifecycle is driven by staff.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::types::{created, message, ok, ok_with, ApiContext, ApiResponse, ApiResult, CallerContext};
use crate::appointment::{self, AppointmentEditRequest, AppointmentRequest, AssignRequest, OptionRequest};
use crate::authorization;
use crate::error::ServiceError;
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, AppointmentFilter, AppointmentOption, AppointmentWithOptions};

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProposeOptionsRequest {
    pub options: Vec<OptionRequest>,
}

/// `GET /api/appointments`: staff see everything, patients their own.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiQuery(query): ApiQuery<AppointmentQuery>,
) -> ApiResult<Vec<Appointment>> {
    let caller = caller.caller();
    let appointments = ctx
        .with_db(move |conn, _| {
            let mut filter = AppointmentFilter {
                patient_id: query.patient_id,
                doctor_id: query.doctor_id,
                status: query.status,
            };
            if let Some(own) = authorization::patient_scope(conn, &caller)? {
                filter.patient_id = Some(own);
            }
            appointment::list_appointments(conn, &filter)
        })
        .await?;
    Ok(ok(appointments))
}

/// `POST /api/appointments`
///
/// Patients request for themselves; staff must name the patient.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(req): ApiJson<AppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), ApiError> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            let patient_id = match authorization::patient_scope(conn, &caller)? {
                Some(own) => {
                    if req.patient_id.is_some_and(|id| id != own) {
                        return Err(ServiceError::Forbidden(
                            "Patients can only request appointments for themselves".into(),
                        ));
                    }
                    own
                }
                None => req
                    .patient_id
                    .ok_or_else(|| ServiceError::InvalidInput("patient_id is required".into()))?,
            };
            appointment::create_appointment(conn, patient_id, &req)
        })
        .await?;
    Ok(created("Appointment requested", appointment))
}

/// `GET /api/appointments/:id`: the appointment with its options.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<AppointmentWithOptions> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            authorization::check_appointment(conn, &caller, id)?;
            appointment::get_with_options(conn, id)
        })
        .await?;
    Ok(ok(appointment))
}

/// `PATCH /api/appointments/:id`: staff only; status is not editable here.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AppointmentEditRequest>,
) -> ApiResult<Appointment> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            appointment::edit_appointment(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Appointment updated", appointment))
}

/// `DELETE /api/appointments/:id`: admin only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let caller = caller.caller();
    ctx.with_db(move |conn, _| {
        caller.require_admin()?;
        appointment::delete_appointment(conn, id)
    })
    .await?;
    Ok(message("Appointment deleted"))
}

/// `GET /api/appointments/doctor/:id`: staff only.
pub async fn by_doctor(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(doctor_id): ApiPath<i64>,
) -> ApiResult<Vec<Appointment>> {
    let caller = caller.caller();
    let appointments = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            appointment::list_for_doctor(conn, doctor_id)
        })
        .await?;
    Ok(ok(appointments))
}

/// `GET /api/appointments/patient/:id`
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(patient_id): ApiPath<i64>,
) -> ApiResult<Vec<Appointment>> {
    let caller = caller.caller();
    let appointments = ctx
        .with_db(move |conn, _| {
            authorization::check_patient(conn, &caller, patient_id)?;
            appointment::list_for_patient(conn, patient_id)
        })
        .await?;
    Ok(ok(appointments))
}

/// `GET /api/appointments/:id/options`
pub async fn options(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<AppointmentOption>> {
    let caller = caller.caller();
    let options = ctx
        .with_db(move |conn, _| {
            authorization::check_appointment(conn, &caller, id)?;
            appointment::list_options(conn, id)
        })
        .await?;
    Ok(ok(options))
}

/// `POST /api/appointments/:id/options`: staff only.
pub async fn propose_options(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ProposeOptionsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentWithOptions>>), ApiError> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            appointment::propose_options(conn, id, &req.options)
        })
        .await?;
    Ok(created("Options proposed", appointment))
}

/// `PATCH /api/appointments/:id/assign`
///
/// Staff may assign any doctor and date. A patient may only accept one of
/// the options proposed for their own appointment.
pub async fn assign(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AssignRequest>,
) -> ApiResult<Appointment> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            if !caller.is_staff() {
                authorization::check_appointment(conn, &caller, id)?;
                if req.option_id.is_none() || req.doctor_id.is_some() || req.scheduled_date.is_some() {
                    return Err(ServiceError::Forbidden(
                        "Patients can only choose one of the proposed options".into(),
                    ));
                }
            }
            appointment::assign_doctor(conn, id, &req)
        })
        .await?;
    Ok(ok_with("Appointment scheduled", appointment))
}

/// `PATCH /api/appointments/:id/cancel`: staff, or the owning patient.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Appointment> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            authorization::check_appointment(conn, &caller, id)?;
            appointment::cancel(conn, id)
        })
        .await?;
    Ok(ok_with("Appointment cancelled", appointment))
}

/// `PATCH /api/appointments/:id/finalize`: staff only.
pub async fn finalize(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Appointment> {
    let caller = caller.caller();
    let appointment = ctx
        .with_db(move |conn, _| {
            caller.require_staff()?;
            appointment::finalize(conn, id)
        })
        .await?;
    Ok(ok_with("Appointment finalized", appointment))
}
