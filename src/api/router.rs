//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the triage API router.
pub fn triage_api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/assessment/run", post(endpoints::assessment::run))
        .route("/assessment/latest", get(endpoints::assessment::latest))
        .route("/assessment/submit", post(endpoints::assessment::submit))
        .with_state(ctx);

    // Layers listed outermost first
    Router::new().nest("/api", api).layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(axum::middleware::from_fn(middleware::request_log::log_request)),
    )
}
