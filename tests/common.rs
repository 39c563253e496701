#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response};
use axum::Router;
use etcd_backup_metrics::config::{Config, ConfigV1};
use etcd_backup_metrics::routes::{create_exposition_router, create_reporting_router};
use etcd_backup_metrics::state::AppState;
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use tower::ServiceExt;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
reporting:
  bind_address: 127.0.0.1:18080
exposition:
  bind_address: 127.0.0.1:12112
  path: /metrics
collector:
  url: http://127.0.0.1:18080/
logging:
  level: "debug"
  format: "json"
"#;

pub fn load_test_config() -> ConfigV1 {
    let config: Config = Figment::new()
        .merge(Yaml::string(TEST_CONFIG))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

/// Both listener routers, sharing one registry as they do in the server.
pub struct TestApp {
    pub reporting: Router,
    pub exposition: Router,
}

pub fn build_app() -> TestApp {
    let state = AppState::new(Arc::new(load_test_config()));
    TestApp {
        reporting: create_reporting_router(state.clone()),
        exposition: create_exposition_router(state),
    }
}

pub fn request(method: Method, path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(body.into())
        .expect("failed to build request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body not valid UTF-8")
}

pub async fn post_report(app: &TestApp, body: &str) -> (u16, String) {
    let response = app
        .reporting
        .clone()
        .oneshot(request(Method::POST, "/", body.to_string()))
        .await
        .expect("request should complete");
    let status = response.status().as_u16();
    (status, body_string(response).await)
}

pub async fn scrape(app: &TestApp) -> String {
    let response = app
        .exposition
        .clone()
        .oneshot(request(Method::GET, "/metrics", Body::empty()))
        .await
        .expect("scrape should complete");
    assert_eq!(response.status().as_u16(), 200);
    body_string(response).await
}

/// Value of the series `name{tenant_cluster_id="cluster"}` in a scrape, if present.
pub fn series_value(scrape: &str, name: &str, cluster: &str) -> Option<f64> {
    let prefix = format!("{}{{tenant_cluster_id=\"{}\"}} ", name, cluster);
    scrape
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|value| value.trim().parse().expect("series value not numeric"))
}
