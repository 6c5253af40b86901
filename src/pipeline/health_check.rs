// Health check pipeline: validate, resolve agent, check, record, respond

use super::authorization::resolve_agent;
use super::executor::{elapsed_ms, OutcomeExecutor};
use super::recorder::record_health_check;
use super::response::HealthCheckResponse;
use super::validation::HealthCheckRequest;
use crate::error::Result;
use crate::services::RecordStore;
use chrono::Utc;

/// Run one health check request
///
/// # Errors
/// - `MissingFields` before any store access
/// - `AgentNotFound` before any write
/// - `Store` when the agent lookup itself fails
pub async fn run(
    store: &dyn RecordStore,
    executor: &OutcomeExecutor,
    request: HealthCheckRequest,
) -> Result<HealthCheckResponse> {
    let input = request.validate()?;
    let agent = resolve_agent(store, &input.agent_id).await?;

    let outcome = executor.check_health(&agent, input.endpoint.as_deref()).await;
    let completed_at = Utc::now();

    record_health_check(store, &input, &outcome, completed_at).await;

    tracing::info!(
        "Health check for agent {} by user {}: {} in {}ms",
        input.agent_id,
        input.user_id,
        outcome.classification.as_str(),
        elapsed_ms(outcome.elapsed)
    );

    Ok(HealthCheckResponse::build(&input, &outcome, completed_at))
}
