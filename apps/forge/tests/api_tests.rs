//! Integration tests for the Nexus Forge HTTP API.
//!
//! Drives the full router in-process with axum-test.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use forge::api::{AppState, VERSION_HEADER, router};
use forge_core::{Orchestrator, STANDARD_BRIDGE_COUNT, STANDARD_PRIMITIVE_COUNT, VERSION};
use serde_json::{Value, json};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Server over a fresh orchestrator.
fn test_server() -> TestServer {
    TestServer::new(router(AppState::new(Orchestrator::new().unwrap()))).unwrap()
}

/// Server with a small request history.
fn test_server_with_history(capacity: usize) -> TestServer {
    let state = AppState::new(Orchestrator::new().unwrap()).with_history_capacity(capacity);
    TestServer::new(router(state)).unwrap()
}

// =============================================================================
// DISCOVERY AND HEALTH
// =============================================================================

#[tokio::test]
async fn test_index_lists_endpoints() {
    let server = test_server();
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["version"], VERSION);
    assert_eq!(body["endpoints"]["process"], "/api/process");
}

#[tokio::test]
async fn test_health_reports_registries() {
    let server = test_server();
    let body: Value = server.get("/api/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_bridges"], STANDARD_BRIDGE_COUNT);
    assert_eq!(body["triadic_processors"], 3);
    assert_eq!(body["system_resonance"], 0.0);
}

#[tokio::test]
async fn test_every_response_carries_version_header() {
    let server = test_server();
    let response = server.get("/api/health").await;
    assert_eq!(response.header(VERSION_HEADER), VERSION);

    let missing = server.get("/api/nowhere").await;
    assert_eq!(missing.header(VERSION_HEADER), VERSION);
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let server = test_server();
    let response = server.get("/api/nowhere").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Endpoint not found");
}

// =============================================================================
// PROCESSING
// =============================================================================

#[tokio::test]
async fn test_process_greeting() {
    let server = test_server();
    let response = server
        .post("/api/process")
        .json(&json!({"input": "Hello!"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["intent"]["type"], "greeting");
    assert_eq!(body["data"]["concepts"], json!([]));
    let resonance = body["data"]["system_resonance"].as_f64().unwrap();
    assert!(resonance > 0.0 && resonance <= 1.0);
}

#[tokio::test]
async fn test_process_accepts_context() {
    let server = test_server();
    let response = server
        .post("/api/process")
        .json(&json!({"input": "Tell me about memory", "context": {"user": "tester"}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["data"]["intent"]["type"], "information_request");
    assert_eq!(body["data"]["concepts"], json!(["memory"]));
}

#[tokio::test]
async fn test_process_missing_input_is_400() {
    let server = test_server();
    let response = server
        .post("/api/process")
        .json(&json!({"text": "wrong field"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Missing 'input' field")
    );
}

#[tokio::test]
async fn test_process_without_json_body_is_400() {
    let server = test_server();
    let response = server.post("/api/process").text("Hello!").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_enhanced_record() {
    let server = test_server();
    let response = server
        .post("/api/process/enhanced")
        .json(&json!({"input": "How does triadic processing work?"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let data = &response.json::<Value>()["data"];
    assert_eq!(data["intent"]["type"], "information_request");
    assert_eq!(data["phases"].as_object().unwrap().len(), 3);
    assert_eq!(
        data["bridge_executions"].as_array().unwrap().len(),
        STANDARD_BRIDGE_COUNT
    );
    assert_eq!(data["triadic_consensus"]["stages_total"], 3);
    assert!(
        data["enhanced_response"]
            .as_str()
            .unwrap()
            .starts_with(data["response"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_status_after_processing() {
    let server = test_server();
    server
        .post("/api/process")
        .json(&json!({"input": "Show me the system status"}))
        .await;

    let body: Value = server.get("/api/status").await.json();
    let data = &body["data"];
    assert_eq!(data["version"], VERSION);
    assert_eq!(data["active_bridges"], STANDARD_BRIDGE_COUNT);
    assert_eq!(data["geometric_primitives"], STANDARD_PRIMITIVE_COUNT);
    assert_eq!(data["execution_log_length"], STANDARD_BRIDGE_COUNT);
    assert!(data["system_resonance"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_filing_counts_start_empty() {
    let server = test_server();
    let body: Value = server.get("/api/filing").await.json();
    assert_eq!(body["data"]["total_items"], 0);
}

// =============================================================================
// BRIDGES
// =============================================================================

#[tokio::test]
async fn test_list_bridges_in_declaration_order() {
    let server = test_server();
    let body: Value = server.get("/api/bridges").await.json();

    assert_eq!(body["total_bridges"], STANDARD_BRIDGE_COUNT);
    let ids: Vec<&String> = body["data"].as_object().unwrap().keys().collect();
    assert_eq!(ids[0], "memory-cognitive");
    assert_eq!(ids[STANDARD_BRIDGE_COUNT - 1], "triadic-harmony");
}

#[tokio::test]
async fn test_execute_bridge_counts() {
    let server = test_server();
    let first = server
        .post("/api/bridges/memory-cognitive/execute")
        .json(&json!({"data": {"query": "recall"}}))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.json::<Value>()["data"]["execution_count"], 1);

    // No body at all is accepted as a null payload.
    let second = server.post("/api/bridges/memory-cognitive/execute").await;
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(second.json::<Value>()["data"]["execution_count"], 2);

    let body: Value = server.get("/api/bridges").await.json();
    assert_eq!(body["data"]["memory-cognitive"]["execution_count"], 2);
    assert_eq!(body["data"]["cognitive-output"]["execution_count"], 0);
}

#[tokio::test]
async fn test_execute_unknown_bridge_is_404() {
    let server = test_server();
    let response = server
        .post("/api/bridges/nonexistent/execute")
        .json(&json!({"data": {}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"],
        "Bridge 'nonexistent' not found"
    );
}

// =============================================================================
// TRIADIC PROCESSORS
// =============================================================================

#[tokio::test]
async fn test_list_processors() {
    let server = test_server();
    let body: Value = server.get("/api/triadic").await.json();

    assert_eq!(body["total_processors"], 3);
    let reception = &body["data"]["data_reception"];
    assert_eq!(reception["elements_count"], 3);
    assert_eq!(reception["active_elements"], 3);
    assert_eq!(reception["threshold"], 0.8);
}

#[tokio::test]
async fn test_process_triadic_returns_consensus() {
    let server = test_server();
    let response = server
        .post("/api/triadic/cognitive_processing/process")
        .json(&json!({"data": "Explain the memory bridge"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let data = &response.json::<Value>()["data"];
    assert_eq!(data["processor_id"], "cognitive_processing");
    assert_eq!(data["processed_elements"].as_array().unwrap().len(), 3);
    let score = data["consensus_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test]
async fn test_process_unknown_processor_is_404() {
    let server = test_server();
    let response = server.post("/api/triadic/ghost/process").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// GEOMETRY
// =============================================================================

#[tokio::test]
async fn test_list_primitives() {
    let server = test_server();
    let body: Value = server.get("/api/geometry").await.json();

    assert_eq!(body["total_primitives"], STANDARD_PRIMITIVE_COUNT);
    assert_eq!(body["data"]["tetrahedron"]["vertex_count"], 4);
    assert_eq!(body["data"]["dodecahedron"]["vertex_count"], 20);
}

#[tokio::test]
async fn test_harmony_default_entropy() {
    let server = test_server();
    let response = server.post("/api/geometry/cube/harmony").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let data = &response.json::<Value>()["data"];
    assert_eq!(data["primitive"], "cube");
    assert_eq!(data["input_entropy"], 0.5);
    let score = data["harmony_score"].as_f64().unwrap();
    assert!(score > 0.0 && score <= 1.0);
}

#[tokio::test]
async fn test_harmony_rejects_out_of_range_entropy() {
    let server = test_server();
    let response = server
        .post("/api/geometry/cube/harmony")
        .json(&json!({"entropy": 1.5}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_harmony_unknown_primitive_is_404() {
    let server = test_server();
    let response = server
        .post("/api/geometry/hypercube/harmony")
        .json(&json!({"entropy": 0.3}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// HISTORY
// =============================================================================

#[tokio::test]
async fn test_history_records_requests() {
    let server = test_server();
    server.get("/api/health").await;
    server.get("/api/bridges").await;

    let body: Value = server.get("/api/history").await.json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["path"], "/api/health");
    assert_eq!(entries[0]["method"], "GET");
    assert_eq!(entries[2]["path"], "/api/history");
}

#[tokio::test]
async fn test_history_limit_and_capacity() {
    let server = test_server_with_history(3);
    for _ in 0..5 {
        server.get("/api/health").await;
    }

    let body: Value = server.get("/api/history").await.json();
    assert_eq!(body["total_requests"], 3);

    let limited: Value = server
        .get("/api/history")
        .add_query_param("limit", 1)
        .await
        .json();
    let entries = limited["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["path"], "/api/history");
}

#[tokio::test]
async fn test_history_bad_limit_uses_default() {
    let server = test_server();
    for _ in 0..25 {
        server.get("/api/health").await;
    }

    let response = server
        .get("/api/history")
        .add_query_param("limit", "abc")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 20);
    assert_eq!(body["total_requests"], 26);
}

// =============================================================================
// WEBHOOKS
// =============================================================================

#[tokio::test]
async fn test_hook_process_echoes_webhook_id() {
    let server = test_server();
    let response = server
        .post("/api/hooks/process")
        .json(&json!({"input": "hello", "webhook_id": "hook-42"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["webhook_id"], "hook-42");
    assert_eq!(body["intent"]["type"], "greeting");
}

#[tokio::test]
async fn test_hook_process_defaults_webhook_id() {
    let server = test_server();
    let body: Value = server
        .post("/api/hooks/process")
        .json(&json!({"input": "status please"}))
        .await
        .json();
    assert_eq!(body["webhook_id"], "unknown");
}

#[tokio::test]
async fn test_hook_process_rejects_missing_input() {
    let server = test_server();
    let response = server
        .post("/api/hooks/process")
        .json(&json!({"webhook_id": "hook-1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(
        response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("Invalid webhook payload")
    );
}

#[tokio::test]
async fn test_hook_status_get_and_post() {
    let server = test_server();
    let get: Value = server.get("/api/hooks/status").await.json();
    let post: Value = server.post("/api/hooks/status").await.json();
    assert_eq!(get["status"], "operational");
    assert_eq!(post["status"], "operational");
}
