//! Assessment endpoints: run, read back, submit.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::core_state::AssessmentRun;
use crate::models::AlertSets;

/// `POST /api/assessment/run` — fetch, classify, cache; returns the alert sets.
pub async fn run(State(ctx): State<ApiContext>) -> Result<Json<AlertSets>, ApiError> {
    let run = ctx.core.run_assessment().await?;
    Ok(Json(run.alerts.clone()))
}

/// `GET /api/assessment/latest` — the cached run with its metadata.
pub async fn latest(State(ctx): State<ApiContext>) -> Result<Json<AssessmentRun>, ApiError> {
    let run = ctx
        .core
        .latest_assessment()?
        .ok_or_else(|| ApiError::NotFound("No assessment has been computed yet".into()))?;
    Ok(Json(run.as_ref().clone()))
}

/// `POST /api/assessment/submit` — forwards the cached alert sets upstream
/// and relays the upstream status and body.
pub async fn submit(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    let upstream = ctx.core.submit_latest().await?;
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(upstream.body)).into_response())
}
