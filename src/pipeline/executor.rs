// Outcome Executor
//
// Performs the single outbound call of a request and classifies the result.
//
// Deadlines:
//
// Each call runs under `tokio::time::timeout`. When the deadline fires the
// in-flight request future is dropped, which aborts the connection; the
// timer is dropped together with the future on every path, so nothing
// outlives the call.
//
// Failure handling:
//
// Nothing escapes this module as an error. Transport failures, deadline
// expiry and non-2xx statuses are captured as `OutcomeError` and folded into
// a classification plus message.
//
// Simulated execution:
//
// `ExecutionMode::Simulated` returns a placeholder result without contacting
// any agent. It exists so the tool endpoint can be exercised before a real
// agent transport is wired up, and is selected only when no endpoint is
// supplied and tool simulation is enabled in configuration.

use crate::payload::{Parameters, Payload};
use crate::records::{format_timestamp, Agent, Link};
use crate::services::GatewayConfig;
use crate::version::{HEALTH_CHECK_USER_AGENT, TOOL_EXECUTION_USER_AGENT};
use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result classification of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthClassification {
    Healthy,
    Unhealthy,
    Timeout,
    Error,
}

impl HealthClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Result classification of a tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolClassification {
    Success,
    Error,
}

impl ToolClassification {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Why an outbound call did not produce a usable answer
#[derive(Debug, Error)]
pub enum OutcomeError {
    /// Remote answered outside the 2xx range
    #[error("HTTP {status}: {reason}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// Deadline expired before the exchange completed
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, TLS or URL failure
    #[error("{0}")]
    Transport(String),

    /// 2xx response whose body could not be decoded
    #[error("{0}")]
    Decode(String),
}

impl OutcomeError {
    fn status(status: StatusCode, body: String) -> Self {
        OutcomeError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OutcomeError::Timeout
        } else {
            OutcomeError::Transport(err.to_string())
        }
    }
}

/// How a tool call is carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// POST to `<endpoint>/tools/<name>`
    Remote { endpoint: String },

    /// Placeholder result, no network
    Simulated,
}

impl ExecutionMode {
    /// Pick the mode for a request
    ///
    /// Returns `None` when no endpoint was supplied and simulation is off.
    pub fn select(endpoint: Option<&str>, simulation_enabled: bool) -> Option<Self> {
        match endpoint {
            Some(endpoint) => Some(ExecutionMode::Remote {
                endpoint: endpoint.to_string(),
            }),
            None if simulation_enabled => Some(ExecutionMode::Simulated),
            None => None,
        }
    }
}

/// Classified health check attempt
#[derive(Debug, Clone, PartialEq)]
pub struct HealthOutcome {
    pub classification: HealthClassification,
    pub elapsed: Duration,
    pub error_message: Option<String>,
}

/// Classified tool execution attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub classification: ToolClassification,
    pub elapsed: Duration,
    pub error_message: Option<String>,

    /// Present only on success
    pub result: Option<Payload>,
}

/// Elapsed wall-clock time rounded to whole milliseconds
pub fn elapsed_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// Deadlines and mode switches for outbound calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub health_check_timeout: Duration,
    pub tool_execution_timeout: Duration,
    pub tool_simulation: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

impl From<&GatewayConfig> for ExecutorSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            health_check_timeout: config.health_check_timeout,
            tool_execution_timeout: config.tool_execution_timeout,
            tool_simulation: config.tool_simulation,
        }
    }
}

#[derive(Serialize)]
struct ToolCallBody<'a> {
    parameters: &'a Parameters,
}

/// Performs and classifies outbound agent calls
///
/// Thread Safety: holds a `reqwest::Client` (pooled, cheap to share); one
/// executor serves all requests.
pub struct OutcomeExecutor {
    client: reqwest::Client,
    settings: ExecutorSettings,
}

impl OutcomeExecutor {
    /// # Errors
    /// - HTTP client construction failure
    pub fn new(settings: ExecutorSettings) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Check an agent
    ///
    /// With an endpoint: GET it under the health-check deadline.
    /// Without: derive the classification from the agent's lifecycle status.
    pub async fn check_health(&self, agent: &Agent, endpoint: Option<&str>) -> HealthOutcome {
        let started = Instant::now();

        let (classification, error_message) = match endpoint {
            Some(endpoint) => {
                tracing::debug!("Checking agent {} at {}", agent.id, endpoint);
                match self.ping(endpoint).await {
                    Ok(()) => (HealthClassification::Healthy, None),
                    Err(err @ OutcomeError::Status { .. }) => {
                        (HealthClassification::Unhealthy, Some(err.to_string()))
                    }
                    Err(OutcomeError::Timeout) => (
                        HealthClassification::Timeout,
                        Some("Health check request timed out".to_string()),
                    ),
                    Err(err) => (HealthClassification::Error, Some(err.to_string())),
                }
            }
            None if agent.is_active() => (HealthClassification::Healthy, None),
            None => (
                HealthClassification::Unhealthy,
                Some(format!("Agent status is {}", agent.status)),
            ),
        };

        let outcome = HealthOutcome {
            classification,
            elapsed: started.elapsed(),
            error_message,
        };

        if !classification.is_healthy() {
            tracing::warn!(
                "Agent {} health check classified {}: {}",
                agent.id,
                classification.as_str(),
                outcome.error_message.as_deref().unwrap_or("")
            );
        }

        outcome
    }

    /// Invoke a tool on an agent, or simulate it
    pub async fn execute_tool(
        &self,
        link: &Link,
        tool_name: &str,
        parameters: &Parameters,
        endpoint: Option<&str>,
    ) -> ToolOutcome {
        let started = Instant::now();

        let result = match ExecutionMode::select(endpoint, self.settings.tool_simulation) {
            Some(ExecutionMode::Remote { endpoint }) => {
                tracing::debug!("Invoking tool '{}' on agent {} at {}", tool_name, link.agent_id, endpoint);
                self.invoke(&endpoint, link.credential(), tool_name, parameters)
                    .await
                    .map_err(|err| match &err {
                        OutcomeError::Status { body, .. } if !body.is_empty() => {
                            format!("{} - {}", err, body)
                        }
                        OutcomeError::Timeout => "Tool execution request timed out".to_string(),
                        other => other.to_string(),
                    })
            }
            Some(ExecutionMode::Simulated) => {
                tracing::debug!("Simulating tool '{}' for agent {}", tool_name, link.agent_id);
                Ok(simulate(tool_name, parameters))
            }
            None => Err("No endpoint supplied and tool simulation is disabled".to_string()),
        };

        match result {
            Ok(payload) => ToolOutcome {
                classification: ToolClassification::Success,
                elapsed: started.elapsed(),
                error_message: None,
                result: Some(payload),
            },
            Err(message) => {
                tracing::warn!("Tool '{}' on agent {} failed: {}", tool_name, link.agent_id, message);
                ToolOutcome {
                    classification: ToolClassification::Error,
                    elapsed: started.elapsed(),
                    error_message: Some(message),
                    result: None,
                }
            }
        }
    }

    async fn ping(&self, endpoint: &str) -> Result<(), OutcomeError> {
        let request = self
            .client
            .get(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, HEALTH_CHECK_USER_AGENT);

        let response = tokio::time::timeout(self.settings.health_check_timeout, request.send())
            .await
            .map_err(|_| OutcomeError::Timeout)?
            .map_err(OutcomeError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OutcomeError::status(status, String::new()));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        endpoint: &str,
        credential: &str,
        tool_name: &str,
        parameters: &Parameters,
    ) -> Result<Payload, OutcomeError> {
        let url = tool_url(endpoint, tool_name)?;

        let exchange = async {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .header(USER_AGENT, TOOL_EXECUTION_USER_AGENT)
                .bearer_auth(credential)
                .json(&ToolCallBody { parameters })
                .send()
                .await
                .map_err(OutcomeError::transport)?;

            let status = response.status();
            if !status.is_success() {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::debug!("Could not read error body from {}: {}", endpoint, e);
                        String::new()
                    }
                };
                return Err(OutcomeError::status(status, body));
            }

            response
                .json::<Payload>()
                .await
                .map_err(|e| OutcomeError::Decode(e.to_string()))
        };

        // Covers connect, headers and body
        tokio::time::timeout(self.settings.tool_execution_timeout, exchange)
            .await
            .map_err(|_| OutcomeError::Timeout)?
    }
}

/// `<endpoint>/tools/<tool_name>`, with the tool name as one encoded segment
fn tool_url(endpoint: &str, tool_name: &str) -> Result<Url, OutcomeError> {
    let invalid = |reason: String| OutcomeError::Transport(format!("Invalid endpoint '{}': {}", endpoint, reason));

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?;
        segments.pop_if_empty().extend(["tools", tool_name]);
    }
    Ok(url)
}

/// Placeholder result for simulated execution
fn simulate(tool_name: &str, parameters: &Parameters) -> Payload {
    Payload::object([
        ("tool", Payload::from(tool_name)),
        ("parameters", Payload::from(parameters.clone())),
        ("timestamp", Payload::from(format_timestamp(Utc::now()))),
        ("simulated", Payload::from(true)),
        (
            "message",
            Payload::from(format!("Tool '{}' executed successfully (simulated)", tool_name)),
        ),
    ])
}
