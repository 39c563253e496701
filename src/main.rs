use std::process::ExitCode;
use std::sync::Arc;

use etcd_backup_metrics::config::{load_config, print_schema};
use etcd_backup_metrics::startup;
use etcd_backup_metrics::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error printing configuration schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = load_config();

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    match startup::run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(
                event_name = "startup.failed",
                event_domain = "startup",
                error = %e,
                "etcd-backup-metrics stopped"
            );
            ExitCode::FAILURE
        }
    }
}
