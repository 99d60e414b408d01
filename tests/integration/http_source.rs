//! Engine running against a mocked entity-management API

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use vm_telemetry::{
    actors::EngineHandle,
    config::SourceConfig,
    monitors::AlertLevel,
    source::HttpSource,
    thresholds::ThresholdStore,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use crate::helpers::*;

fn entity_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("vm-{id}"),
        "allocated_cpu_count": 2,
        "allocated_memory_mb": 4096
    })
}

fn snapshot_json(id: &str, cpu: f64, memory_used_mb: f64) -> serde_json::Value {
    json!({
        "entity_id": id,
        "timestamp": "2024-05-01T12:00:00Z",
        "cpu_usage_percent": cpu,
        "memory_used_mb": memory_used_mb,
        "memory_available_mb": 1000.0,
        "disk_read_bytes": 1048576,
        "disk_write_bytes": 0,
        "network_rx_bytes": 0,
        "network_tx_bytes": 0
    })
}

async fn engine_for(server: &MockServer, token: Option<&str>) -> EngineHandle {
    let source = HttpSource::new(&SourceConfig {
        url: format!("{}/", server.uri()),
        token: token.map(str::to_string),
        request_timeout_ms: 2000,
    })
    .unwrap();

    EngineHandle::spawn(Arc::new(source), ThresholdStore::default(), manual_polling_config())
}

#[tokio::test]
async fn test_engine_over_http_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entities"))
        .and(header("X-MONITORING-SECRET", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            entity_json("web"),
            entity_json("db"),
            entity_json("gone")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entities/web/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json("web", 20.0, 100.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entities/db/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json("db", 92.0, 300.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entities/gone/snapshot"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = engine_for(&server, Some("s3cret")).await;
    let point = engine.poll_now().await.unwrap();

    assert_eq!(point.running_entity_count, 3);
    assert_eq!(point.sampled_entity_count, 2);
    assert_eq!(point.avg_cpu_percent, 56.0);
    assert_eq!(point.total_memory_used_percent, 20.0);
    assert_eq!(point.total_disk_read_mb, 2.0);

    let ranking = engine.ranking().await;
    let ids: Vec<_> = ranking.iter().map(|r| r.entity.id.as_str()).collect();
    assert_eq!(ids, vec!["db", "web", "gone"]);
    assert_eq!(ranking[0].cpu_level, AlertLevel::Critical);
    assert!(ranking[2].snapshot.is_none());

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_server_error_on_one_snapshot_is_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entities"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([entity_json("ok"), entity_json("broken")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entities/ok/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json("ok", 40.0, 500.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entities/broken/snapshot"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = engine_for(&server, None).await;
    let point = engine.poll_now().await.unwrap();

    assert_eq!(point.sampled_entity_count, 1);
    assert_eq!(point.avg_cpu_percent, 40.0);
    assert_eq!(point.total_memory_used_percent, 50.0);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_entity_list_failure_fails_poll_now() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entities"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let engine = engine_for(&server, None).await;

    assert!(engine.poll_now().await.is_err());
    assert!(engine.history().await.is_empty());
    assert!(engine.status().await.last_error.is_some());

    engine.shutdown().await.unwrap();
}
