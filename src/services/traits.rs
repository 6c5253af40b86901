// Record store port
//
// Design Decision: Trait-based abstraction for persistence
//
// The pipeline only ever needs four operations from persistence, so that is
// all the trait exposes. Adapters:
// - InMemoryStore: local development and tests
// - RestStore: PostgREST-compatible HTTP backend
//
// A store handle is obtained per request from a StoreProvider, which receives
// the inbound Authorization header. Nothing about the caller's identity lives
// in module-level state.

use super::error::StoreResult;
use crate::records::{Agent, AuditLogEntry, LinkKey, LinkUpdate, LinkedAgent};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;

/// Persistence operations required by the request pipelines
///
/// All traits are Send + Sync so handles can cross tokio tasks.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch an agent by id
    ///
    /// Returns `Ok(None)` when no such agent exists.
    async fn get_agent(&self, agent_id: &str) -> StoreResult<Option<Agent>>;

    /// Fetch the caller's link to an agent, joined with the agent
    ///
    /// Only links whose status is "connected" are returned.
    async fn get_connected_link(
        &self,
        user_id: &str,
        agent_id: &str,
    ) -> StoreResult<Option<LinkedAgent>>;

    /// Apply a partial update to the link(s) matching `key`
    ///
    /// Updating a key that matches nothing is not an error.
    async fn update_link(&self, key: &LinkKey, update: &LinkUpdate) -> StoreResult<()>;

    /// Append one audit log entry
    async fn append_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()>;
}

/// Builds a store handle scoped to one inbound request
///
/// Usage:
/// ```ignore
/// let store = provider.store_for(headers.get("authorization").and_then(|v| v.to_str().ok()));
/// let agent = store.get_agent("agent-1").await?;
/// ```
pub trait StoreProvider: Send + Sync {
    /// `authorization` is the raw inbound Authorization header, if any
    fn store_for(&self, authorization: Option<&str>) -> Arc<dyn RecordStore>;
}
