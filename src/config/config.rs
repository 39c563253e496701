use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Environment variable pointing at the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "ETCD_BACKUP_METRICS_CONFIG";
/// Prefix for environment overrides, e.g. `ETCD_BACKUP_METRICS_REPORTING__BIND_ADDRESS`.
pub const ENV_PREFIX: &str = "ETCD_BACKUP_METRICS_";

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
pub const DEFAULT_COLLECTOR_URL: &str = "http://etcd-backup-metrics-collector:8080/";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: both listeners, the downstream collector and logging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub exposition: ExpositionConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The listener accepting backup reports.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ReportingConfig {
    pub bind_address: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        ReportingConfig {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The listener serving the Prometheus scrape endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ExpositionConfig {
    pub bind_address: String,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ExpositionConfig {
    fn default() -> Self {
        ExpositionConfig {
            bind_address: "0.0.0.0:2112".to_string(),
            path: default_metrics_path(),
        }
    }
}

/// The downstream collector that backup jobs forward their reports to.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CollectorConfig {
    pub url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            url: DEFAULT_COLLECTOR_URL.to_string(),
        }
    }
}

/// Layers the built-in defaults, the YAML file and environment overrides.
pub fn default_figment() -> Figment {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a configuration from any figment, resolving the version tag.
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load the process configuration, exiting if it cannot be parsed.
pub fn load_config() -> ConfigV1 {
    match load_config_from(default_figment()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
    }

    #[test]
    fn defaults_match_fixed_ports_and_collector() {
        let config = load_config_from(defaults()).unwrap();

        assert_eq!(config.reporting.bind_address, "0.0.0.0:8080");
        assert_eq!(config.exposition.bind_address, "0.0.0.0:2112");
        assert_eq!(config.exposition.path, "/metrics");
        assert_eq!(config.collector.url, DEFAULT_COLLECTOR_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = r#"
version: "1.0.0"
reporting:
  bind_address: "127.0.0.1:9000"
logging:
  level: "debug"
  format: "json"
"#;
        let config = load_config_from(defaults().merge(Yaml::string(yaml))).unwrap();

        assert_eq!(config.reporting.bind_address, "127.0.0.1:9000");
        assert_eq!(config.exposition.bind_address, "0.0.0.0:2112");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let result = load_config_from(Figment::new().merge(Yaml::string("version: \"9.9.9\"")));
        assert!(result.is_err());
    }
}
