//! Shared application state.
//!
//! Contains the state that is shared by the reporting and exposition
//! listeners: the configuration and the backup metric registry.

use crate::config::ConfigV1;
use crate::metrics::BackupMetrics;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Both listeners hold a clone; the metrics handle points at one registry.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Backup metric registry updated by reports and read by scrapes.
    pub metrics: BackupMetrics,
}

impl AppState {
    pub fn new(config: Arc<ConfigV1>) -> Self {
        AppState {
            config,
            metrics: BackupMetrics::new(),
        }
    }
}
