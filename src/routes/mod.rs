//! HTTP route definitions and handlers.
//!
//! Routes are split across two routers, one per listener: the reporting
//! listener (backup reports and health) and the exposition listener
//! (Prometheus scrapes).

mod health_routes;
mod metrics_routes;
mod report_routes;

use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit};

/// Creates the router for the reporting listener.
///
/// `GET /healthz` answers directly; every other request is treated as a
/// backup report. Report bodies are read in full, with no size cap.
pub fn create_reporting_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(report_routes::routes())
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Creates the router for the Prometheus exposition listener.
pub fn create_exposition_router(state: AppState) -> Router {
    let path = state.config.exposition.path.clone();
    Router::new()
        .merge(metrics_routes::routes(&path))
        .with_state(state)
}
