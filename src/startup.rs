//! Application startup and server initialization.
//!
//! This module binds the reporting and exposition listeners and runs them
//! side by side on one shared metric registry.

use std::io;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("metrics path '{0}' must start with '/'")]
    InvalidMetricsPath(String),
    #[error("could not bind {listener} listener to {address}: {source}")]
    Bind {
        listener: &'static str,
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("{listener} listener failed: {source}")]
    Serve {
        listener: &'static str,
        #[source]
        source: io::Error,
    },
}

async fn bind(listener: &'static str, address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            listener,
            address: address.to_string(),
            source,
        })
}

async fn serve(listener: &'static str, tcp: TcpListener, app: Router) -> Result<(), StartupError> {
    let address = tcp
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(
        event_name = "startup.listener.started",
        event_domain = "startup",
        listener,
        bind_address = address.as_str(),
        "Starting {} listener on {}",
        listener,
        address
    );

    axum::serve(tcp, app)
        .await
        .map_err(|source| StartupError::Serve { listener, source })
}

/// Initializes and runs both listeners.
///
/// Both addresses are bound before anything is served, so a port conflict
/// fails startup as a whole. The reporting listener then runs on a
/// background task; the exposition listener runs on the calling task and
/// its outcome is returned.
///
/// # Errors
///
/// Returns an error if either listener fails to bind, or if the exposition
/// listener encounters a runtime error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), StartupError> {
    if !config.exposition.path.starts_with('/') {
        return Err(StartupError::InvalidMetricsPath(
            config.exposition.path.clone(),
        ));
    }

    let state = AppState::new(config.clone());

    let reporting = bind("reporting", &config.reporting.bind_address).await?;
    let exposition = bind("exposition", &config.exposition.bind_address).await?;

    let reporting_app = routes::create_reporting_router(state.clone());
    let exposition_app = routes::create_exposition_router(state);

    tokio::spawn(async move {
        if let Err(e) = serve("reporting", reporting, reporting_app).await {
            error!(
                event_name = "startup.listener.failed",
                event_domain = "startup",
                listener = "reporting",
                error = %e,
                "reporting listener stopped"
            );
        }
    });

    serve("exposition", exposition, exposition_app).await
}
