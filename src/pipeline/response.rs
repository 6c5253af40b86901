// Response Builder
//
// JSON bodies returned with HTTP 200 once a pipeline reaches the executor.

use super::executor::{elapsed_ms, HealthClassification, HealthOutcome, ToolOutcome};
use super::validation::{HealthCheckInput, ToolExecutionInput};
use crate::payload::{Parameters, Payload};
use crate::records::format_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckDetails {
    pub agent_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub last_checked: String,
}

/// Body of a completed health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub success: bool,
    pub status: HealthClassification,
    pub response_time_ms: u64,
    pub details: HealthCheckDetails,
}

impl HealthCheckResponse {
    pub fn build(input: &HealthCheckInput, outcome: &HealthOutcome, at: DateTime<Utc>) -> Self {
        Self {
            success: outcome.classification.is_healthy(),
            status: outcome.classification,
            response_time_ms: elapsed_ms(outcome.elapsed),
            details: HealthCheckDetails {
                agent_id: input.agent_id.clone(),
                endpoint: input.endpoint.clone(),
                error_message: outcome.error_message.clone(),
                last_checked: format_timestamp(at),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteToolDetails {
    pub agent_id: String,
    pub tool_name: String,
    pub parameters: Parameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub timestamp: String,
}

/// Body of a completed tool execution
///
/// `result` is set on success, `error` on failure; never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteToolResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Payload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
    pub details: ExecuteToolDetails,
}

impl ExecuteToolResponse {
    pub fn build(input: &ToolExecutionInput, outcome: &ToolOutcome, at: DateTime<Utc>) -> Self {
        Self {
            success: outcome.classification.is_success(),
            result: outcome.result.clone(),
            error: outcome.error_message.clone(),
            execution_time_ms: elapsed_ms(outcome.elapsed),
            details: ExecuteToolDetails {
                agent_id: input.agent_id.clone(),
                tool_name: input.tool_name.clone(),
                parameters: input.parameters.clone(),
                endpoint: input.endpoint.clone(),
                timestamp: format_timestamp(at),
            },
        }
    }
}
