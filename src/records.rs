// Persistent record types
//
// These mirror the rows the gateway reads and writes through the record store:
//
// - `Agent`: registry entry, read-only here
// - `Link`: caller-to-agent association, mutated after every request
// - `AuditLogEntry`: append-only usage log
//
// `LinkUpdate` is the partial write the State Recorder issues against a link.
// Only the fields that are `Some` are written, matching PATCH semantics of the
// REST store.

use crate::payload::Payload;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Agent lifecycle status that counts as reachable without a remote check
pub const AGENT_STATUS_ACTIVE: &str = "active";

/// Link status required for tool execution
pub const LINK_STATUS_CONNECTED: &str = "connected";

/// Render a timestamp the way every response and detail payload carries it
///
/// RFC 3339, UTC, millisecond precision: `2026-10-18T09:30:00.000Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Treat an explicit JSON null like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Registered remote agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Lifecycle status, e.g. "active", "inactive", "disabled"
    pub status: String,

    /// Declared capabilities
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<ToolCapability>,

    #[serde(default)]
    pub metadata: Payload,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        self.status == AGENT_STATUS_ACTIVE
    }

    /// Find a declared tool by exact name
    pub fn capability(&self, tool_name: &str) -> Option<&ToolCapability> {
        self.tools.iter().find(|tool| tool.name == tool_name)
    }
}

/// Tool declared in an agent's capability list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCapability {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter expectations (usually a JSON schema); not enforced here
    #[serde(default, alias = "input_schema", alias = "inputSchema")]
    pub parameters: Payload,
}

/// Per-link configuration
///
/// `api_key` is forwarded as the bearer credential on tool calls. Everything
/// else is kept opaque.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Payload>,
}

// Manual impl keeps the credential out of logs
impl std::fmt::Debug for LinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Caller-to-agent association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub user_id: String,
    pub agent_id: String,

    /// Connection status, e.g. "connected"
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_count: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub error_count: u64,

    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_health_check: Option<DateTime<Utc>>,

    #[serde(default)]
    pub health_status: Option<String>,

    #[serde(default)]
    pub health_details: Payload,

    #[serde(default, deserialize_with = "null_as_default")]
    pub config: LinkConfig,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Link {
    pub fn is_connected(&self) -> bool {
        self.status == LINK_STATUS_CONNECTED
    }

    /// Credential for the remote endpoint, empty when none is configured
    pub fn credential(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or("")
    }

    pub fn key(&self) -> LinkKey {
        LinkKey::Id(self.id.clone())
    }
}

/// A link joined with its agent
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedAgent {
    pub link: Link,
    pub agent: Agent,
}

/// How a link update addresses its row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKey {
    Id(String),
    Pair { user_id: String, agent_id: String },
}

impl LinkKey {
    pub fn pair(user_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        LinkKey::Pair {
            user_id: user_id.into(),
            agent_id: agent_id.into(),
        }
    }

    pub fn matches(&self, link: &Link) -> bool {
        match self {
            LinkKey::Id(id) => link.id == *id,
            LinkKey::Pair { user_id, agent_id } => {
                link.user_id == *user_id && link.agent_id == *agent_id
            }
        }
    }
}

/// Partial write against a link row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_health_check: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_details: Option<Payload>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,
}

impl LinkUpdate {
    fn touch(at: DateTime<Utc>) -> Self {
        Self {
            last_health_check: None,
            health_status: None,
            health_details: None,
            usage_count: None,
            error_count: None,
            last_used_at: None,
            updated_at: at,
        }
    }

    /// Record a health check result
    pub fn health_check(at: DateTime<Utc>, status: &str, details: Payload) -> Self {
        Self {
            last_health_check: Some(at),
            health_status: Some(status.to_string()),
            health_details: Some(details),
            ..Self::touch(at)
        }
    }

    /// Count a successful tool call against the link as it was resolved
    ///
    /// The counter is computed from the resolved row, so concurrent requests
    /// on the same link resolve last-write-wins.
    pub fn tool_success(link: &Link, at: DateTime<Utc>) -> Self {
        Self {
            usage_count: Some(link.usage_count + 1),
            last_used_at: Some(at),
            ..Self::touch(at)
        }
    }

    /// Count a failed tool call against the link as it was resolved
    pub fn tool_failure(link: &Link, at: DateTime<Utc>) -> Self {
        Self {
            error_count: Some(link.error_count + 1),
            ..Self::touch(at)
        }
    }

    /// Apply this update to an in-memory row
    pub fn apply(&self, link: &mut Link) {
        if let Some(at) = self.last_health_check {
            link.last_health_check = Some(at);
        }
        if let Some(status) = &self.health_status {
            link.health_status = Some(status.clone());
        }
        if let Some(details) = &self.health_details {
            link.health_details = details.clone();
        }
        if let Some(count) = self.usage_count {
            link.usage_count = count;
        }
        if let Some(count) = self.error_count {
            link.error_count = count;
        }
        if let Some(at) = self.last_used_at {
            link.last_used_at = Some(at);
        }
        link.updated_at = Some(self.updated_at);
    }
}

/// Kind of request an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    HealthCheck,
    ToolExecution,
}

/// Coarse outcome stored in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Error,
}

/// Immutable record of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user_id: String,
    pub agent_id: String,
    pub action_type: ActionKind,
    pub action_details: Payload,
    pub duration_ms: u64,
    pub status: AuditStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}
