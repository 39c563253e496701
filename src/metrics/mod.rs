//! Metrics collection and exposition for Prometheus.
//!
//! This module owns the backup metric registry and the recording rules
//! applied to every accepted backup report.

mod recorder;

pub use recorder::{BackupMetrics, MetricsRecorder, TENANT_CLUSTER_LABEL};
