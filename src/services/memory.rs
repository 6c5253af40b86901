// In-memory record store
//
// Design Decision: Shared tables behind a tokio RwLock
//
// Used for local development (optionally seeded from a JSON file) and as the
// store behind integration tests. Clones share the same tables, so the test
// harness can keep a handle and inspect what the pipelines wrote.
//
// Semantics follow the REST adapter: updating an unmatched key is a no-op and
// every matching row is updated.

use super::error::StoreResult;
use super::traits::{RecordStore, StoreProvider};
use crate::records::{Agent, AuditLogEntry, Link, LinkKey, LinkUpdate, LinkedAgent};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Seed file contents: `{"agents": [...], "links": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub agents: Vec<Agent>,

    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Default)]
struct Tables {
    agents: HashMap<String, Agent>,
    links: Vec<Link>,
    audit_log: Vec<AuditLogEntry>,
}

/// Record store held entirely in process memory
///
/// Usage:
/// ```ignore
/// let store = InMemoryStore::new();
/// store.insert_agent(agent).await;
/// let api = AppBuilder::new().with_store_provider(Arc::new(store.clone())).build()?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: StoreSeed) -> Self {
        let tables = Tables {
            agents: seed
                .agents
                .into_iter()
                .map(|agent| (agent.id.clone(), agent))
                .collect(),
            links: seed.links,
            audit_log: Vec::new(),
        };
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Load agents and links from a JSON seed file
    ///
    /// # Errors
    /// - File not found or unreadable
    /// - Invalid JSON / record shape
    pub async fn load_seed_file(path: &Path) -> StoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let seed: StoreSeed = serde_json::from_str(&content)?;

        tracing::info!(
            "Seeded in-memory store from {:?}: {} agents, {} links",
            path,
            seed.agents.len(),
            seed.links.len()
        );

        Ok(Self::from_seed(seed))
    }

    pub async fn insert_agent(&self, agent: Agent) {
        self.tables
            .write()
            .await
            .agents
            .insert(agent.id.clone(), agent);
    }

    pub async fn insert_link(&self, link: Link) {
        self.tables.write().await.links.push(link);
    }

    /// First link for a (user, agent) pair, regardless of status
    pub async fn link(&self, user_id: &str, agent_id: &str) -> Option<Link> {
        let key = LinkKey::pair(user_id, agent_id);
        self.tables
            .read()
            .await
            .links
            .iter()
            .find(|link| key.matches(link))
            .cloned()
    }

    pub async fn links(&self) -> Vec<Link> {
        self.tables.read().await.links.clone()
    }

    pub async fn audit_log(&self) -> Vec<AuditLogEntry> {
        self.tables.read().await.audit_log.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get_agent(&self, agent_id: &str) -> StoreResult<Option<Agent>> {
        Ok(self.tables.read().await.agents.get(agent_id).cloned())
    }

    async fn get_connected_link(
        &self,
        user_id: &str,
        agent_id: &str,
    ) -> StoreResult<Option<LinkedAgent>> {
        let tables = self.tables.read().await;
        let key = LinkKey::pair(user_id, agent_id);

        let Some(link) = tables
            .links
            .iter()
            .find(|link| key.matches(link) && link.is_connected())
        else {
            return Ok(None);
        };

        // Inner join: a link whose agent row is gone is not returned
        Ok(tables.agents.get(agent_id).map(|agent| LinkedAgent {
            link: link.clone(),
            agent: agent.clone(),
        }))
    }

    async fn update_link(&self, key: &LinkKey, update: &LinkUpdate) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        for link in tables.links.iter_mut().filter(|link| key.matches(link)) {
            update.apply(link);
        }
        Ok(())
    }

    async fn append_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()> {
        self.tables.write().await.audit_log.push(entry.clone());
        Ok(())
    }
}

impl StoreProvider for InMemoryStore {
    fn store_for(&self, _authorization: Option<&str>) -> Arc<dyn RecordStore> {
        Arc::new(self.clone())
    }
}
