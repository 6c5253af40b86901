// Authorization Resolver
//
// Read-only lookups that decide whether a request may proceed. Empty results
// become 404-class errors; store failures propagate as `GatewayError::Store`.

use crate::error::{GatewayError, Result};
use crate::records::{Agent, LinkedAgent};
use crate::services::RecordStore;

/// Existence check used by health checks
///
/// No caller-agent link is required.
pub async fn resolve_agent(store: &dyn RecordStore, agent_id: &str) -> Result<Agent> {
    store
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| GatewayError::AgentNotFound(agent_id.to_string()))
}

/// Link-and-capability check used by tool execution
///
/// The caller must hold a connected link to the agent and the agent must
/// declare `tool_name`.
pub async fn resolve_tool_access(
    store: &dyn RecordStore,
    user_id: &str,
    agent_id: &str,
    tool_name: &str,
) -> Result<LinkedAgent> {
    let linked = store
        .get_connected_link(user_id, agent_id)
        .await?
        .ok_or_else(|| GatewayError::LinkNotFound {
            user_id: user_id.to_string(),
            agent_id: agent_id.to_string(),
        })?;

    if linked.agent.capability(tool_name).is_none() {
        return Err(GatewayError::ToolNotFound {
            agent_id: agent_id.to_string(),
            tool: tool_name.to_string(),
        });
    }

    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mocks::test_helpers::*;
    use crate::services::{MockRecordStore, StoreError};

    #[tokio::test]
    async fn test_resolve_agent_found() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_agent()
            .withf(|id| id == "a1")
            .times(1)
            .returning(|_| Ok(Some(active_agent("a1", &["echo"]))));

        let agent = resolve_agent(&store, "a1").await.unwrap();
        assert_eq!(agent.id, "a1");
    }

    #[tokio::test]
    async fn test_resolve_agent_missing_is_not_found() {
        let mut store = MockRecordStore::new();
        store.expect_get_agent().returning(|_| Ok(None));

        let err = resolve_agent(&store, "ghost").await.unwrap_err();
        assert!(matches!(err, GatewayError::AgentNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_not_found() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_agent()
            .returning(|_| Err(StoreError::Backend("down".into())));

        let err = resolve_agent(&store, "a1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Store(_)));
    }

    #[tokio::test]
    async fn test_tool_access_requires_link() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_connected_link()
            .withf(|user_id, agent_id| user_id == "u1" && agent_id == "a1")
            .returning(|_, _| Ok(None));

        let err = resolve_tool_access(&store, "u1", "a1", "echo").await.unwrap_err();
        assert!(matches!(err, GatewayError::LinkNotFound { .. }));
    }

    #[tokio::test]
    async fn test_tool_access_requires_capability() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_connected_link()
            .returning(|_, _| Ok(Some(linked_agent("u1", "a1", &["search"]))));

        let err = resolve_tool_access(&store, "u1", "a1", "echo").await.unwrap_err();
        assert_eq!(err.to_string(), "Tool 'echo' not found in agent capabilities");
    }

    #[tokio::test]
    async fn test_tool_access_granted() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_connected_link()
            .returning(|_, _| Ok(Some(linked_agent("u1", "a1", &["search", "echo"]))));

        let linked = resolve_tool_access(&store, "u1", "a1", "echo").await.unwrap();
        assert_eq!(linked.link.user_id, "u1");
    }
}
