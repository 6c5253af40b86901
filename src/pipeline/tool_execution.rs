// Tool execution pipeline: validate, resolve link and capability, invoke,
// record, respond

use super::authorization::resolve_tool_access;
use super::executor::{elapsed_ms, OutcomeExecutor};
use super::recorder::record_tool_execution;
use super::response::ExecuteToolResponse;
use super::validation::ExecuteToolRequest;
use crate::error::Result;
use crate::services::RecordStore;
use chrono::Utc;

/// Run one tool execution request
///
/// # Errors
/// - `MissingFields` before any store access
/// - `LinkNotFound` / `ToolNotFound` before any write
/// - `Store` when the link lookup itself fails
pub async fn run(
    store: &dyn RecordStore,
    executor: &OutcomeExecutor,
    request: ExecuteToolRequest,
) -> Result<ExecuteToolResponse> {
    let input = request.validate()?;
    let linked =
        resolve_tool_access(store, &input.user_id, &input.agent_id, &input.tool_name).await?;

    let outcome = executor
        .execute_tool(
            &linked.link,
            &input.tool_name,
            &input.parameters,
            input.endpoint.as_deref(),
        )
        .await;
    let completed_at = Utc::now();

    record_tool_execution(store, &linked.link, &input, &outcome, completed_at).await;

    tracing::info!(
        "Tool '{}' on agent {} by user {}: {} in {}ms",
        input.tool_name,
        input.agent_id,
        input.user_id,
        if outcome.classification.is_success() { "success" } else { "error" },
        elapsed_ms(outcome.elapsed)
    );

    Ok(ExecuteToolResponse::build(&input, &outcome, completed_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::payload::Payload;
    use crate::pipeline::executor::ExecutorSettings;
    use crate::services::mocks::test_helpers::*;
    use crate::services::{MockRecordStore, StoreError};

    fn executor() -> OutcomeExecutor {
        OutcomeExecutor::new(ExecutorSettings::default()).unwrap()
    }

    fn request(tool_name: Option<&str>) -> ExecuteToolRequest {
        ExecuteToolRequest {
            agent_id: Some("a1".into()),
            user_id: Some("u1".into()),
            tool_name: tool_name.map(String::from),
            parameters: None,
            endpoint: None,
        }
    }

    #[tokio::test]
    async fn test_missing_tool_name_touches_nothing() {
        let store = MockRecordStore::new();
        let err = run(&store, &executor(), request(None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: toolName");
    }

    #[tokio::test]
    async fn test_unconnected_link_writes_nothing() {
        let mut store = MockRecordStore::new();
        store.expect_get_connected_link().times(1).returning(|_, _| Ok(None));

        let err = run(&store, &executor(), request(Some("echo"))).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_undeclared_tool_writes_nothing() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_connected_link()
            .returning(|u, a| Ok(Some(linked_agent(u, a, &["search"]))));

        let err = run(&store, &executor(), request(Some("echo"))).await.unwrap_err();
        assert!(matches!(err, GatewayError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_internal() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_connected_link()
            .returning(|_, _| Err(StoreError::Backend("connection reset".into())));

        let err = run(&store, &executor(), request(Some("echo"))).await.unwrap_err();
        assert!(!err.is_validation() && !err.is_not_found());
    }

    #[tokio::test]
    async fn test_simulated_execution_records_once() {
        let mut store = create_recording_store();
        store
            .expect_get_connected_link()
            .returning(|u, a| Ok(Some(linked_agent(u, a, &["echo"]))));

        let response = run(&store, &executor(), request(Some("echo"))).await.unwrap();
        assert!(response.success);
        assert_eq!(
            response.result.as_ref().and_then(|r| r.get("simulated")),
            Some(&Payload::from(true))
        );
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_execution_still_records_once() {
        let executor = OutcomeExecutor::new(ExecutorSettings {
            tool_simulation: false,
            ..ExecutorSettings::default()
        })
        .unwrap();

        let mut store = create_recording_store();
        store
            .expect_get_connected_link()
            .returning(|u, a| Ok(Some(linked_agent(u, a, &["echo"]))));

        let response = run(&store, &executor, request(Some("echo"))).await.unwrap();
        assert!(!response.success);
        assert!(response.result.is_none());
        assert!(response.error.is_some());
    }
}
