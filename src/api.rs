// API layer for programmatic access to the gateway
// The HTTP server is a thin shell over this; tests and embedders can call it directly.
// Design principle: one store handle per request, built from the caller's authorization

use crate::error::Result;
use crate::pipeline::{
    health_check, tool_execution, ExecuteToolRequest, ExecuteToolResponse, HealthCheckRequest,
    HealthCheckResponse, OutcomeExecutor,
};
use crate::services::StoreProvider;
use std::sync::Arc;

/// Core API for gateway functionality
///
/// Cheap to clone; all state is shared behind `Arc`.
#[derive(Clone)]
pub struct GatewayApi {
    /// Builds the per-request record store handle
    stores: Arc<dyn StoreProvider>,

    /// Shared outbound client and deadlines
    executor: Arc<OutcomeExecutor>,
}

impl GatewayApi {
    pub fn new(stores: Arc<dyn StoreProvider>, executor: Arc<OutcomeExecutor>) -> Self {
        Self { stores, executor }
    }

    pub fn executor(&self) -> &OutcomeExecutor {
        &self.executor
    }

    /// Health-check an agent on behalf of the caller identified by `authorization`
    ///
    /// `authorization` is the inbound `Authorization` header value, if any.
    pub async fn check_health(
        &self,
        authorization: Option<&str>,
        request: HealthCheckRequest,
    ) -> Result<HealthCheckResponse> {
        let store = self.stores.store_for(authorization);
        health_check::run(store.as_ref(), &self.executor, request).await
    }

    /// Proxy a tool call on behalf of the caller identified by `authorization`
    pub async fn execute_tool(
        &self,
        authorization: Option<&str>,
        request: ExecuteToolRequest,
    ) -> Result<ExecuteToolResponse> {
        let store = self.stores.store_for(authorization);
        tool_execution::run(store.as_ref(), &self.executor, request).await
    }
}
