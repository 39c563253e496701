//! Backup report intake.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use tracing::{debug, warn};

use crate::metrics::MetricsRecorder;
use crate::models::BackupReport;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers the catch-all report handler.
pub fn routes() -> Router<AppState> {
    Router::new().fallback(record_report)
}

/// Decodes a backup report from the raw body and records it.
///
/// Answers `OK` once recorded, or `Bad request` without touching the
/// registry when the body is not a valid report.
pub(super) async fn record_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, HTTPError> {
    let report = BackupReport::from_json(&body).map_err(|e| {
        warn!(
            event_name = "reporting.decode.failed",
            event_domain = "reporting",
            error = %e,
            body_len = body.len(),
            "failed to decode backup report"
        );
        HTTPError::bad_request()
    })?;

    state.metrics.record_backup(&report.cluster, &report.bundle);

    debug!(
        event_name = "reporting.report.recorded",
        event_domain = "reporting",
        tenant_cluster_id = report.cluster.as_str(),
        successful = report.bundle.successful,
        "backup report recorded"
    );

    Ok("OK")
}
