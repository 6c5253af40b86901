// PostgREST-compatible record store
//
// Design Decision: Plain reqwest calls against the PostgREST table API
//
// Tables used:
// - agents        (read)
// - user_agents   (read joined with agents, patch)
// - usage_logs    (insert)
//
// Every request carries the project `apikey` and the caller's own
// Authorization header, so row-level security is evaluated as the caller.
// A RestStore is built per request by RestStoreProvider::store_for; the
// underlying reqwest::Client (connection pool) is shared.

use super::error::{StoreError, StoreResult};
use super::traits::{RecordStore, StoreProvider};
use crate::records::{Agent, AuditLogEntry, Link, LinkKey, LinkUpdate, LinkedAgent, LINK_STATUS_CONNECTED};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const AGENTS_TABLE: &str = "agents";
const LINKS_TABLE: &str = "user_agents";
const AUDIT_TABLE: &str = "usage_logs";

/// Upper bound for a single store round-trip
const STORE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds per-request RestStore handles sharing one HTTP client
pub struct RestStoreProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestStoreProvider {
    /// # Errors
    /// - HTTP client construction failure (TLS backend unavailable)
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(STORE_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }
}

impl StoreProvider for RestStoreProvider {
    fn store_for(&self, authorization: Option<&str>) -> Arc<dyn RecordStore> {
        let authorization = authorization
            .map(str::to_string)
            .unwrap_or_else(|| format!("Bearer {}", self.anon_key));

        Arc::new(RestStore {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            anon_key: self.anon_key.clone(),
            authorization,
        })
    }
}

/// Store handle acting on behalf of one caller
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    authorization: String,
}

/// `user_agents` row with its embedded `agents(*)` relation
#[derive(Deserialize)]
struct LinkRow {
    #[serde(flatten)]
    link: Link,

    agents: Option<Agent>,
}

impl RestStore {
    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, &self.authorization)
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn key_filters(key: &LinkKey) -> Vec<(&'static str, String)> {
        match key {
            LinkKey::Id(id) => vec![("id", format!("eq.{}", id))],
            LinkKey::Pair { user_id, agent_id } => vec![
                ("user_id", format!("eq.{}", user_id)),
                ("agent_id", format!("eq.{}", agent_id)),
            ],
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn get_agent(&self, agent_id: &str) -> StoreResult<Option<Agent>> {
        let response = self
            .request(Method::GET, AGENTS_TABLE)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", agent_id))])
            .send()
            .await?;

        let rows: Vec<Agent> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    async fn get_connected_link(
        &self,
        user_id: &str,
        agent_id: &str,
    ) -> StoreResult<Option<LinkedAgent>> {
        let response = self
            .request(Method::GET, LINKS_TABLE)
            .query(&[
                ("select", "*,agents(*)".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("agent_id", format!("eq.{}", agent_id)),
                ("status", format!("eq.{}", LINK_STATUS_CONNECTED)),
            ])
            .send()
            .await?;

        let rows: Vec<LinkRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(rows.into_iter().find_map(|row| {
            row.agents.map(|agent| LinkedAgent {
                link: row.link,
                agent,
            })
        }))
    }

    async fn update_link(&self, key: &LinkKey, update: &LinkUpdate) -> StoreResult<()> {
        let response = self
            .request(Method::PATCH, LINKS_TABLE)
            .query(&Self::key_filters(key))
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn append_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()> {
        let response = self
            .request(Method::POST, AUDIT_TABLE)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn_postgrest() -> String {
        let app = Router::new()
            .route(
                "/rest/v1/agents",
                get(|headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                    // Echo the forwarded credentials back through the agent name
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let apikey = headers
                        .get("apikey")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    if query.get("id").map(String::as_str) == Some("eq.a1") {
                        Json(json!([{"id": "a1", "name": format!("{}|{}", auth, apikey), "status": "active"}]))
                    } else {
                        Json(json!([]))
                    }
                }),
            )
            .route(
                "/rest/v1/user_agents",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(query.get("status").map(String::as_str), Some("eq.connected"));
                    Json(json!([{
                        "id": "l1", "user_id": "u1", "agent_id": "a1", "status": "connected",
                        "usage_count": 2, "config": {"api_key": "k"},
                        "agents": {"id": "a1", "status": "active", "tools": [{"name": "echo"}]}
                    }]))
                })
                .merge(patch(|Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                    if query.get("id").map(String::as_str) == Some("eq.l1") && body.get("usage_count").is_some() {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::BAD_REQUEST
                    }
                })),
            )
            .route(
                "/rest/v1/usage_logs",
                axum::routing::post(|| async { (StatusCode::FORBIDDEN, "new row violates row-level security policy") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_get_agent_forwards_caller_authorization() {
        let base = spawn_postgrest().await;
        let provider = RestStoreProvider::new(base, "anon").unwrap();
        let store = provider.store_for(Some("Bearer caller-jwt"));

        let agent = store.get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.name, "Bearer caller-jwt|anon");
        assert!(store.get_agent("a2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_authorization_falls_back_to_anon_key() {
        let base = spawn_postgrest().await;
        let provider = RestStoreProvider::new(base, "anon").unwrap();
        let agent = provider.store_for(None).get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.name, "Bearer anon|anon");
    }

    #[tokio::test]
    async fn test_connected_link_with_embedded_agent() {
        let base = spawn_postgrest().await;
        let store = RestStoreProvider::new(base, "anon").unwrap().store_for(None);

        let linked = store.get_connected_link("u1", "a1").await.unwrap().unwrap();
        assert_eq!(linked.link.usage_count, 2);
        assert_eq!(linked.link.credential(), "k");
        assert!(linked.agent.capability("echo").is_some());

        let update = LinkUpdate::tool_success(&linked.link, Utc::now());
        store.update_link(&linked.link.key(), &update).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_insert_is_store_error() {
        let base = spawn_postgrest().await;
        let store = RestStoreProvider::new(base, "anon").unwrap().store_for(None);

        let entry = AuditLogEntry {
            id: uuid::Uuid::new_v4(),
            user_id: "u1".into(),
            agent_id: "a1".into(),
            action_type: crate::records::ActionKind::ToolExecution,
            action_details: Default::default(),
            duration_ms: 1,
            status: crate::records::AuditStatus::Success,
            error_message: None,
            created_at: Utc::now(),
        };

        match store.append_audit_log(&entry).await {
            Err(StoreError::Status { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("row-level security"));
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
    }
}
