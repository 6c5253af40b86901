// Shared fixtures for the HTTP integration tests
//
// Every test gets its own seeded InMemoryStore, its own router and, where a
// remote agent is needed, its own stub agent bound to 127.0.0.1:0.

#![allow(dead_code)]

use agent_gateway::server::router;
use agent_gateway::services::{InMemoryStore, StoreSeed};
use agent_gateway::{AppBuilder, ExecutorSettings};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Deadline used for both outbound calls in tests
pub const TEST_DEADLINE: Duration = Duration::from_millis(300);

/// Serve a deterministic remote agent and return its base URL
///
/// - `GET /healthy` -> 200
/// - `GET /unhealthy` -> 503
/// - `GET /hang` -> never answers within the test deadline
/// - `POST /tools/echo` -> echoes parameters and the Authorization header
/// - `POST /tools/fail` -> 500 "tool exploded"
/// - `POST /tools/hang` -> never answers within the test deadline
pub async fn spawn_stub_agent() -> String {
    async fn hang() -> &'static str {
        tokio::time::sleep(Duration::from_secs(10)).await;
        "too late"
    }

    let app = Router::new()
        .route("/healthy", get(|| async { "ok" }))
        .route("/unhealthy", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/hang", get(hang))
        .route(
            "/tools/echo",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                Json(json!({
                    "echo": body["parameters"],
                    "authorization": headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok()),
                }))
            }),
        )
        .route(
            "/tools/fail",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "tool exploded") }),
        )
        .route("/tools/hang", post(hang));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// Store with:
/// - agent `a1` (active; tools echo, fail, hang) linked to `u1` with api key `agent-key`
/// - agent `a2` (disabled) linked to `u1`
/// - agent `a3` (active) with a revoked link to `u1`
pub fn seeded_store() -> InMemoryStore {
    let seed: StoreSeed = serde_json::from_value(json!({
        "agents": [
            {"id": "a1", "name": "Echo Agent", "status": "active",
             "tools": [{"name": "echo"}, {"name": "fail"}, {"name": "hang"}]},
            {"id": "a2", "name": "Parked Agent", "status": "disabled", "tools": []},
            {"id": "a3", "name": "Other Agent", "status": "active", "tools": [{"name": "echo"}]}
        ],
        "links": [
            {"id": "l1", "user_id": "u1", "agent_id": "a1", "status": "connected",
             "usage_count": 10, "error_count": 1, "config": {"api_key": "agent-key"}},
            {"id": "l2", "user_id": "u1", "agent_id": "a2", "status": "connected"},
            {"id": "l3", "user_id": "u1", "agent_id": "a3", "status": "revoked"}
        ]
    }))
    .unwrap();
    InMemoryStore::from_seed(seed)
}

/// Gateway router over `store` with short deadlines
pub fn app(store: &InMemoryStore) -> Router {
    app_with_simulation(store, true)
}

pub fn app_with_simulation(store: &InMemoryStore, tool_simulation: bool) -> Router {
    let api = AppBuilder::new()
        .with_store_provider(Arc::new(store.clone()))
        .with_executor_settings(ExecutorSettings {
            health_check_timeout: TEST_DEADLINE,
            tool_execution_timeout: TEST_DEADLINE,
            tool_simulation,
        })
        .build()
        .unwrap();
    router(api)
}

/// POST a JSON body and return status plus decoded JSON response
pub async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}

pub async fn post_raw(app: Router, path: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("origin", "https://console.example")
        .header("authorization", "Bearer caller-token")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
