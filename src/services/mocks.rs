// Mock test helpers and record fixtures
//
// Usage:
//     use crate::services::mocks::test_helpers::*;
//     let mut store = create_recording_store();
//     store.expect_get_agent().returning(|_| Ok(Some(active_agent("a1", &[]))));

#[cfg(test)]
pub mod test_helpers {
    use super::super::traits::*;
    use crate::records::{Agent, Link, LinkConfig, LinkedAgent, ToolCapability};

    /// Agent with status "active" declaring the given tools
    pub fn active_agent(id: &str, tools: &[&str]) -> Agent {
        agent_with_status(id, "active", tools)
    }

    pub fn agent_with_status(id: &str, status: &str, tools: &[&str]) -> Agent {
        Agent {
            id: id.to_string(),
            name: format!("Agent {}", id),
            status: status.to_string(),
            tools: tools
                .iter()
                .map(|name| ToolCapability {
                    name: name.to_string(),
                    description: None,
                    parameters: Default::default(),
                })
                .collect(),
            metadata: Default::default(),
        }
    }

    /// Connected link with zeroed counters and no credential
    pub fn connected_link(user_id: &str, agent_id: &str) -> Link {
        Link {
            id: format!("link-{}-{}", user_id, agent_id),
            user_id: user_id.to_string(),
            agent_id: agent_id.to_string(),
            status: "connected".to_string(),
            usage_count: 0,
            error_count: 0,
            last_used_at: None,
            last_health_check: None,
            health_status: None,
            health_details: Default::default(),
            config: LinkConfig::default(),
            updated_at: None,
        }
    }

    pub fn linked_agent(user_id: &str, agent_id: &str, tools: &[&str]) -> LinkedAgent {
        LinkedAgent {
            link: connected_link(user_id, agent_id),
            agent: active_agent(agent_id, tools),
        }
    }

    /// Mock store whose two write operations succeed exactly once each
    ///
    /// Reads have no expectations: add them per test.
    pub fn create_recording_store() -> MockRecordStore {
        let mut mock = MockRecordStore::new();
        mock.expect_update_link().times(1).returning(|_, _| Ok(()));
        mock.expect_append_audit_log().times(1).returning(|_| Ok(()));
        mock
    }
}
