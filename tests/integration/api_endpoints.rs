//! Operator API served over a real socket

use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vm_telemetry::{
    actors::EngineHandle,
    api::{ApiConfig, ApiState, spawn_api_server},
};

use crate::helpers::*;

async fn start(auth_token: Option<&str>) -> (EngineHandle, SocketAddr) {
    let source = source_with(&[("a", 95.0, 100.0), ("b", 75.0, 900.0), ("c", 5.0, 100.0)]).await;
    let engine = spawn_engine(&source, manual_polling_config());

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        auth_token: auth_token.map(str::to_string),
        enable_cors: false,
    };

    let addr = spawn_api_server(config, ApiState::new(engine.clone()))
        .await
        .unwrap();

    (engine, addr)
}

fn url(addr: SocketAddr, route: &str) -> String {
    format!("http://{addr}/api/v1{route}")
}

#[tokio::test]
async fn test_health_and_history() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    let health: Value = client.get(url(addr, "/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["polling_enabled"], false);

    let response = client.post(url(addr, "/poll")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let point: Value = response.json().await.unwrap();
    assert_eq!(point["sampled_entity_count"], 3);

    let history: Value = client.get(url(addr, "/history")).send().await.unwrap().json().await.unwrap();
    assert_eq!(history["count"], 1);
    assert_eq!(history["points"][0]["avg_cpu_percent"], point["avg_cpu_percent"]);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_entities_ranked_with_counts() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    client.post(url(addr, "/poll")).send().await.unwrap();

    let body: Value = client.get(url(addr, "/entities")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["count"], 3);

    // b warns on both metrics, a is critical on cpu only
    let ids: Vec<_> = body["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["entity"]["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(body["entities"][0]["cpu_level"], "warning");
    assert_eq!(body["entities"][0]["memory_level"], "warning");
    assert_eq!(body["entities"][1]["cpu_level"], "critical");
    assert_eq!(body["counts"]["cpu_critical_count"], 1);
    assert_eq!(body["counts"]["cpu_warning_count"], 1);
    assert_eq!(body["counts"]["mem_warning_count"], 1);

    let alerts: Value = client.get(url(addr, "/alerts")).send().await.unwrap().json().await.unwrap();
    assert_eq!(alerts, body["counts"]);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_update_thresholds() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    let update = json!({
        "cpu_warning": 50.0,
        "cpu_critical": 80.0,
        "memory_warning": 60.0,
        "memory_critical": 85.0
    });
    let response = client.put(url(addr, "/thresholds")).json(&update).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let current: Value = client.get(url(addr, "/thresholds")).send().await.unwrap().json().await.unwrap();
    assert_eq!(current, update);

    // b at 90% memory crosses the lowered critical line
    client.post(url(addr, "/poll")).send().await.unwrap();
    let counts: Value = client.get(url(addr, "/alerts")).send().await.unwrap().json().await.unwrap();
    assert_eq!(counts["cpu_critical_count"], 1);
    assert_eq!(counts["mem_critical_count"], 1);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_thresholds_rejected() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    let response = client
        .put(url(addr, "/thresholds"))
        .json(&json!({
            "cpu_warning": 95.0,
            "cpu_critical": 90.0,
            "memory_warning": 80.0,
            "memory_critical": 95.0
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("cpu"));

    let current: Value = client.get(url(addr, "/thresholds")).send().await.unwrap().json().await.unwrap();
    assert_eq!(current["cpu_warning"], 70.0);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_toggle_polling() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .put(url(addr, "/polling"))
        .json(&json!({ "enabled": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["enabled"], true);
    assert!(engine.is_enabled());

    client
        .put(url(addr, "/polling"))
        .json(&json!({ "enabled": false }))
        .send()
        .await
        .unwrap();

    let body: Value = client.get(url(addr, "/polling")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["enabled"], false);
    assert_eq!(body["history_capacity"], 60);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_auth_required() {
    let (engine, addr) = start(Some("secret")).await;
    let client = reqwest::Client::new();

    let missing = client.get(url(addr, "/health")).send().await.unwrap();
    assert_eq!(missing.status(), 401);

    let wrong = client
        .get(url(addr, "/health"))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 403);

    let ok = client
        .get(url(addr, "/health"))
        .bearer_auth("secret")
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_poll_after_shutdown_is_server_error() {
    let (engine, addr) = start(None).await;
    let client = reqwest::Client::new();

    engine.shutdown().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let response = client.post(url(addr, "/poll")).send().await.unwrap();
    assert_eq!(response.status(), 500);
}
