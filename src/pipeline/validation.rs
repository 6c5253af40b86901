// Request Validator
//
// Decoded request bodies keep every field optional so that a missing field
// is reported as a `MissingFields` error listing all of them at once, rather
// than as a decode failure naming only the first.

use crate::error::{GatewayError, Result};
use crate::payload::Parameters;
use serde::{Deserialize, Serialize};

/// Body of `POST /agent-health-check`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckRequest {
    #[serde(default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    /// Explicit remote endpoint to check
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Body of `POST /execute-agent-tool`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolRequest {
    #[serde(default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    pub parameters: Option<Parameters>,

    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Health check request with required fields present
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckInput {
    pub agent_id: String,
    pub user_id: String,
    pub endpoint: Option<String>,
}

/// Tool execution request with required fields present
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionInput {
    pub agent_id: String,
    pub user_id: String,
    pub tool_name: String,
    pub parameters: Parameters,
    pub endpoint: Option<String>,
}

// Absent and empty are the same thing for identifiers
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn require(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match present(value) {
        Some(v) => v,
        None => {
            missing.push(field);
            String::new()
        }
    }
}

impl HealthCheckRequest {
    /// # Errors
    /// `MissingFields` naming every absent or empty required field
    pub fn validate(self) -> Result<HealthCheckInput> {
        let mut missing = Vec::new();
        let agent_id = require(self.agent_id, "agentId", &mut missing);
        let user_id = require(self.user_id, "userId", &mut missing);

        if !missing.is_empty() {
            return Err(GatewayError::MissingFields(missing));
        }

        Ok(HealthCheckInput {
            agent_id,
            user_id,
            endpoint: present(self.endpoint),
        })
    }
}

impl ExecuteToolRequest {
    /// # Errors
    /// `MissingFields` naming every absent or empty required field
    pub fn validate(self) -> Result<ToolExecutionInput> {
        let mut missing = Vec::new();
        let agent_id = require(self.agent_id, "agentId", &mut missing);
        let user_id = require(self.user_id, "userId", &mut missing);
        let tool_name = require(self.tool_name, "toolName", &mut missing);

        if !missing.is_empty() {
            return Err(GatewayError::MissingFields(missing));
        }

        Ok(ToolExecutionInput {
            agent_id,
            user_id,
            tool_name,
            parameters: self.parameters.unwrap_or_default(),
            endpoint: present(self.endpoint),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use serde_json::json;

    fn missing_of(err: GatewayError) -> Vec<&'static str> {
        match err {
            GatewayError::MissingFields(fields) => fields,
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_health_check_valid() {
        let request: HealthCheckRequest =
            serde_json::from_value(json!({"agentId": "a1", "userId": "u1"})).unwrap();
        let input = request.validate().unwrap();
        assert_eq!(input.agent_id, "a1");
        assert_eq!(input.endpoint, None);
    }

    #[test]
    fn test_health_check_lists_all_missing() {
        let err = HealthCheckRequest::default().validate().unwrap_err();
        assert_eq!(missing_of(err), vec!["agentId", "userId"]);
    }

    #[test]
    fn test_empty_strings_are_missing() {
        let request: HealthCheckRequest =
            serde_json::from_value(json!({"agentId": "", "userId": "u1", "endpoint": ""})).unwrap();
        assert_eq!(missing_of(request.validate().unwrap_err()), vec!["agentId"]);
    }

    #[test]
    fn test_empty_endpoint_is_none() {
        let request: ExecuteToolRequest = serde_json::from_value(
            json!({"agentId": "a1", "userId": "u1", "toolName": "echo", "endpoint": ""}),
        )
        .unwrap();
        assert_eq!(request.validate().unwrap().endpoint, None);
    }

    #[test]
    fn test_tool_name_required() {
        let request: ExecuteToolRequest =
            serde_json::from_value(json!({"agentId": "a1", "userId": "u1"})).unwrap();
        assert_eq!(missing_of(request.validate().unwrap_err()), vec!["toolName"]);
    }

    #[test]
    fn test_parameters_default_to_empty_map() {
        let request: ExecuteToolRequest = serde_json::from_value(
            json!({"agentId": "a1", "userId": "u1", "toolName": "echo", "parameters": null}),
        )
        .unwrap();
        assert!(request.validate().unwrap().parameters.is_empty());
    }

    #[test]
    fn test_parameters_are_kept() {
        let request: ExecuteToolRequest = serde_json::from_value(json!({
            "agentId": "a1", "userId": "u1", "toolName": "echo",
            "parameters": {"text": "hi", "times": 2}
        }))
        .unwrap();
        let input = request.validate().unwrap();
        assert_eq!(input.parameters.get("text"), Some(&Payload::from("hi")));
        assert_eq!(input.parameters.get("times").and_then(Payload::as_u64), Some(2));
    }
}
