//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub has_result: bool,
}

/// `GET /api/health` — liveness plus whether an assessment is cached.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let has_result = ctx.core.latest_assessment()?.is_some();

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        has_result,
    }))
}
