// Centralized error handling using thiserror for type-safe error management
//
// Design Decision: One error enum for everything that can abort a request
//
// Every variant maps to exactly one HTTP status in `server::error`. Failures
// of the outbound agent call are NOT represented here: the Outcome Executor
// folds them into a classification, so they never abort a request.
//
// Mapping:
// - MissingFields / InvalidBody -> 400
// - AgentNotFound / LinkNotFound / ToolNotFound -> 404
// - everything else -> 500 (detail logged server-side only)

use crate::services::StoreError;
use thiserror::Error;

/// Main error type for the agent gateway
///
/// Usage:
/// ```ignore
/// async fn resolve(store: &dyn RecordStore, id: &str) -> Result<Agent> {
///     store.get_agent(id).await?
///         .ok_or_else(|| GatewayError::AgentNotFound(id.to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required request fields were absent or empty
    ///
    /// Contains the wire names of the missing fields, in declaration order.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Request body could not be decoded as the expected JSON shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Health check target does not exist in the agent registry
    #[error("Agent not found")]
    AgentNotFound(String),

    /// No connected link between the caller and the agent
    #[error("Agent not found or not connected")]
    LinkNotFound { user_id: String, agent_id: String },

    /// The agent does not declare the requested tool
    #[error("Tool '{tool}' not found in agent capabilities")]
    ToolNotFound { agent_id: String, tool: String },

    /// Record store read failed (distinct from an empty result)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Environment variable missing or unreadable
    #[error("Environment error: {0}")]
    Env(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything unanticipated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// True for errors caused by the caller's input (HTTP 400)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingFields(_) | Self::InvalidBody(_))
    }

    /// True for authorization lookups that came back empty (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::LinkNotFound { .. } | Self::ToolNotFound { .. }
        )
    }
}

/// Type alias for Result with GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;
