//! Health check endpoint.

use axum::extract::State;
use serde::Serialize;

use crate::api::types::{ok, ApiContext, ApiResult};
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tables: i64,
}

/// `GET /api/health`: liveness, including a database round trip.
pub async fn check(State(ctx): State<ApiContext>) -> ApiResult<HealthResponse> {
    let tables = ctx.with_db(|conn, _| Ok(db::count_tables(conn)?)).await?;
    Ok(ok(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        tables,
    }))
}
