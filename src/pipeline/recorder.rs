// State Recorder
//
// Folds an outcome into one Link update and one audit log entry. Both writes
// are always attempted; a failed write is logged and swallowed because the
// caller's response is already decided by the outcome.

use super::executor::{elapsed_ms, HealthOutcome, ToolOutcome};
use super::validation::{HealthCheckInput, ToolExecutionInput};
use crate::payload::Payload;
use crate::records::{
    format_timestamp, ActionKind, AuditLogEntry, AuditStatus, Link, LinkKey, LinkUpdate,
};
use crate::services::RecordStore;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which of the two writes landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    pub link_updated: bool,
    pub audit_logged: bool,
}

/// Persist a health check outcome against the (caller, agent) link
pub async fn record_health_check(
    store: &dyn RecordStore,
    input: &HealthCheckInput,
    outcome: &HealthOutcome,
    at: DateTime<Utc>,
) -> Recorded {
    let response_time_ms = elapsed_ms(outcome.elapsed);
    let status = outcome.classification.as_str();

    let mut health_details = vec![("response_time_ms", Payload::from(response_time_ms))];
    if let Some(endpoint) = &input.endpoint {
        health_details.push(("endpoint", Payload::from(endpoint.as_str())));
    }
    if let Some(message) = &outcome.error_message {
        health_details.push(("error_message", Payload::from(message.as_str())));
    }
    health_details.push(("last_checked", Payload::from(format_timestamp(at))));

    let update = LinkUpdate::health_check(at, status, Payload::object(health_details));
    let key = LinkKey::pair(&input.user_id, &input.agent_id);

    let entry = AuditLogEntry {
        id: Uuid::new_v4(),
        user_id: input.user_id.clone(),
        agent_id: input.agent_id.clone(),
        action_type: ActionKind::HealthCheck,
        action_details: Payload::object([
            ("endpoint", Payload::from(input.endpoint.clone())),
            ("response_time_ms", Payload::from(response_time_ms)),
            ("status", Payload::from(status)),
        ]),
        duration_ms: response_time_ms,
        status: if outcome.classification.is_healthy() {
            AuditStatus::Success
        } else {
            AuditStatus::Error
        },
        error_message: outcome.error_message.clone(),
        created_at: at,
    };

    write_both(store, &key, &update, &entry).await
}

/// Persist a tool execution outcome against the resolved link
///
/// Counters are derived from `link` as it was read during authorization.
pub async fn record_tool_execution(
    store: &dyn RecordStore,
    link: &Link,
    input: &ToolExecutionInput,
    outcome: &ToolOutcome,
    at: DateTime<Utc>,
) -> Recorded {
    let duration_ms = elapsed_ms(outcome.elapsed);
    let succeeded = outcome.classification.is_success();

    let update = if succeeded {
        LinkUpdate::tool_success(link, at)
    } else {
        LinkUpdate::tool_failure(link, at)
    };

    let mut details = vec![
        ("tool_name", Payload::from(input.tool_name.as_str())),
        ("parameters", Payload::from(input.parameters.clone())),
        ("endpoint", Payload::from(input.endpoint.clone())),
    ];
    if succeeded {
        if let Some(result) = &outcome.result {
            details.push(("result", result.clone()));
        }
    }

    let entry = AuditLogEntry {
        id: Uuid::new_v4(),
        user_id: input.user_id.clone(),
        agent_id: input.agent_id.clone(),
        action_type: ActionKind::ToolExecution,
        action_details: Payload::object(details),
        duration_ms,
        status: if succeeded {
            AuditStatus::Success
        } else {
            AuditStatus::Error
        },
        error_message: outcome.error_message.clone(),
        created_at: at,
    };

    write_both(store, &link.key(), &update, &entry).await
}

async fn write_both(
    store: &dyn RecordStore,
    key: &LinkKey,
    update: &LinkUpdate,
    entry: &AuditLogEntry,
) -> Recorded {
    let link_updated = match store.update_link(key, update).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to update link {:?}: {}", key, e);
            false
        }
    };

    let audit_logged = match store.append_audit_log(entry).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                "Failed to append audit log entry {} for agent {}: {}",
                entry.id,
                entry.agent_id,
                e
            );
            false
        }
    };

    Recorded {
        link_updated,
        audit_logged,
    }
}
