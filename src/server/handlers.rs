// Request handlers
//
// Bodies are decoded by hand so malformed JSON maps onto the gateway's own
// 400 response instead of axum's extractor rejection.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::GatewayApi;
use crate::error::GatewayError;
use crate::pipeline::{ExecuteToolRequest, ExecuteToolResponse, HealthCheckRequest, HealthCheckResponse};
use crate::server::error::ApiError;

// Decoded by hand so a missing or wrong Content-Type is not a rejection
fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()).into())
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

pub(crate) async fn agent_health_check(
    State(api): State<GatewayApi>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HealthCheckResponse>, ApiError> {
    let request: HealthCheckRequest = decode(&body)?;
    let response = api.check_health(authorization(&headers), request).await?;
    Ok(Json(response))
}

pub(crate) async fn execute_agent_tool(
    State(api): State<GatewayApi>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExecuteToolResponse>, ApiError> {
    let request: ExecuteToolRequest = decode(&body)?;
    let response = api.execute_tool(authorization(&headers), request).await?;
    Ok(Json(response))
}

/// Liveness of the gateway itself
pub(crate) async fn health() -> &'static str {
    "ok"
}
