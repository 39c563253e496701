//! Client for forwarding backup reports to the downstream metrics collector.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::config::CollectorConfig;
use crate::models::{BackupReport, MeasurementBundle};

#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to serialize backup report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to reach collector: {0}")]
    Request(#[from] reqwest::Error),
    #[error("collector rejected backup report with status {0}")]
    Status(StatusCode),
}

/// Posts backup reports to a collector's reporting listener.
///
/// Each call is a single attempt; failures are returned to the caller and
/// never retried or logged here.
#[derive(Clone, Debug)]
pub struct CollectorClient {
    client: reqwest::Client,
    url: String,
}

impl CollectorClient {
    pub fn new(url: impl Into<String>) -> Self {
        CollectorClient {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(config.url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `bundle` for `cluster` as one flat JSON object.
    pub async fn send(&self, bundle: &MeasurementBundle, cluster: &str) -> Result<(), SendError> {
        let body = serde_json::to_vec(&BackupReport::new(cluster, *bundle))?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Status(status));
        }
        Ok(())
    }
}

impl Default for CollectorClient {
    fn default() -> Self {
        Self::from_config(&CollectorConfig::default())
    }
}
