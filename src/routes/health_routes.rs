//! Health check endpoints.

use super::report_routes::record_report;
use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
};

/// Registers health check routes.
///
/// Only `GET` is a health check; other methods on `/healthz` are reports
/// like any other path. `HEAD` is routed explicitly since `get` would
/// otherwise answer it too.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/healthz",
        get(health_check)
            .head(record_report)
            .fallback(record_report),
    )
}

/// Simple health check endpoint.
///
/// Returns a 200 OK status to indicate the service is running.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
