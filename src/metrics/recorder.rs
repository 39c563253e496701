//! Metrics recording implementation using Prometheus.

use prometheus::{
    Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
    register_int_counter_vec_with_registry, register_int_gauge_vec_with_registry,
};
use std::sync::Arc;

use crate::models::MeasurementBundle;

/// Label distinguishing the tenant cluster a backup belongs to.
pub const TENANT_CLUSTER_LABEL: &str = "tenant_cluster_id";

const NAMESPACE: &str = "etcd_backup";

/// Trait for recording backup outcomes.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records one backup report for `cluster`.
    ///
    /// The attempt counter is always incremented. A successful backup
    /// overwrites the timing and size gauges and increments the success
    /// counter; a failed one only increments the failure counter and leaves
    /// the gauges at their last value.
    fn record_backup(&self, cluster: &str, bundle: &MeasurementBundle);
}

/// Prometheus registry holding the etcd backup series.
///
/// Cloning is cheap and every clone records into the same registry.
#[derive(Clone)]
pub struct BackupMetrics {
    registry: Arc<Registry>,

    // Last successful backup
    creation_time: IntGaugeVec,
    encryption_time: IntGaugeVec,
    upload_time: IntGaugeVec,
    backup_size: IntGaugeVec,

    // Outcome counters
    attempts_count: IntCounterVec,
    success_count: IntCounterVec,
    failure_count: IntCounterVec,
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE)
}

impl BackupMetrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());
        let labels = &[TENANT_CLUSTER_LABEL];

        let creation_time = register_int_gauge_vec_with_registry!(
            opts(
                "creation_time_ms",
                "Gauge about the time in ms spent by the ETCD backup creation process."
            ),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_creation_time_ms");

        let encryption_time = register_int_gauge_vec_with_registry!(
            opts(
                "encryption_time_ms",
                "Gauge about the time in ms spent by the ETCD backup encryption process."
            ),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_encryption_time_ms");

        let upload_time = register_int_gauge_vec_with_registry!(
            opts(
                "upload_time_ms",
                "Gauge about the time in ms spent by the ETCD backup upload process."
            ),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_upload_time_ms");

        let backup_size = register_int_gauge_vec_with_registry!(
            opts(
                "size_bytes",
                "Gauge about the size of the backup file, as seen by S3."
            ),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_size_bytes");

        let attempts_count = register_int_counter_vec_with_registry!(
            opts("attempts_count", "Count of attempted backups"),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_attempts_count");

        let success_count = register_int_counter_vec_with_registry!(
            opts("success_count", "Count of successful backups"),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_success_count");

        let failure_count = register_int_counter_vec_with_registry!(
            opts("failure_count", "Count of failed backups"),
            labels,
            registry.clone()
        )
        .expect("Failed to register etcd_backup_failure_count");

        BackupMetrics {
            registry,
            creation_time,
            encryption_time,
            upload_time,
            backup_size,
            attempts_count,
            success_count,
            failure_count,
        }
    }

    /// Content type of the output produced by [`BackupMetrics::render`].
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl Default for BackupMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for BackupMetrics {
    fn record_backup(&self, cluster: &str, bundle: &MeasurementBundle) {
        let labels = &[cluster];

        self.attempts_count.with_label_values(labels).inc();

        if bundle.successful {
            self.creation_time
                .with_label_values(labels)
                .set(bundle.creation_time_ms);
            self.encryption_time
                .with_label_values(labels)
                .set(bundle.encryption_time_ms);
            self.upload_time
                .with_label_values(labels)
                .set(bundle.upload_time_ms);
            self.backup_size
                .with_label_values(labels)
                .set(bundle.backup_size_bytes);
            self.success_count.with_label_values(labels).inc();
        } else {
            self.failure_count.with_label_values(labels).inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn gauges(metrics: &BackupMetrics, cluster: &str) -> [i64; 4] {
        [
            metrics.creation_time.with_label_values(&[cluster]).get(),
            metrics.encryption_time.with_label_values(&[cluster]).get(),
            metrics.upload_time.with_label_values(&[cluster]).get(),
            metrics.backup_size.with_label_values(&[cluster]).get(),
        ]
    }

    fn counters(metrics: &BackupMetrics, cluster: &str) -> [u64; 3] {
        [
            metrics.attempts_count.with_label_values(&[cluster]).get(),
            metrics.success_count.with_label_values(&[cluster]).get(),
            metrics.failure_count.with_label_values(&[cluster]).get(),
        ]
    }

    #[test]
    fn success_sets_gauges_and_counts() {
        let metrics = BackupMetrics::new();

        metrics.record_backup("c1", &MeasurementBundle::success(1024, 50, 30, 200));

        assert_eq!(gauges(&metrics, "c1"), [50, 30, 200, 1024]);
        assert_eq!(counters(&metrics, "c1"), [1, 1, 0]);
    }

    #[test]
    fn gauges_keep_last_observation() {
        let metrics = BackupMetrics::new();

        metrics.record_backup("c1", &MeasurementBundle::success(1024, 50, 30, 200));
        metrics.record_backup("c1", &MeasurementBundle::success(10, 5, 3, 2));

        assert_eq!(gauges(&metrics, "c1"), [5, 3, 2, 10]);
        assert_eq!(counters(&metrics, "c1"), [2, 2, 0]);
    }

    #[test]
    fn failure_leaves_gauges_stale() {
        let metrics = BackupMetrics::new();

        metrics.record_backup("c1", &MeasurementBundle::success(1024, 50, 30, 200));
        let failed = MeasurementBundle {
            successful: false,
            backup_size_bytes: 9,
            creation_time_ms: 9,
            encryption_time_ms: 9,
            upload_time_ms: 9,
        };
        metrics.record_backup("c1", &failed);

        assert_eq!(gauges(&metrics, "c1"), [50, 30, 200, 1024]);
        assert_eq!(counters(&metrics, "c1"), [2, 1, 1]);
    }

    #[test]
    fn clusters_are_tracked_separately() {
        let metrics = BackupMetrics::new();

        metrics.record_backup("a", &MeasurementBundle::success(1, 1, 1, 1));
        metrics.record_backup("b", &MeasurementBundle::failure());

        assert_eq!(counters(&metrics, "a"), [1, 1, 0]);
        assert_eq!(counters(&metrics, "b"), [1, 0, 1]);
    }

    #[test]
    fn concurrent_recordings_lose_no_increments() {
        let metrics = BackupMetrics::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        let bundle = if i % 2 == 0 {
                            MeasurementBundle::success(i, i, i, i)
                        } else {
                            MeasurementBundle::failure()
                        };
                        metrics.record_backup("shared", &bundle);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters(&metrics, "shared"), [2000, 1000, 1000]);
    }

    #[test]
    fn render_uses_namespaced_names_and_cluster_label() {
        let metrics = BackupMetrics::new();
        metrics.record_backup("mycluster", &MeasurementBundle::success(1024, 50, 30, 200));

        let text = metrics.render();

        assert!(text.contains("etcd_backup_size_bytes{tenant_cluster_id=\"mycluster\"} 1024"));
        assert!(text.contains("etcd_backup_creation_time_ms{tenant_cluster_id=\"mycluster\"} 50"));
        assert!(text.contains("etcd_backup_attempts_count{tenant_cluster_id=\"mycluster\"} 1"));
        assert!(text.contains("# TYPE etcd_backup_success_count counter"));
        assert!(text.contains("# TYPE etcd_backup_upload_time_ms gauge"));
    }
}
