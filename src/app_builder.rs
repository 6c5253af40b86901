// AppBuilder pattern for dependency construction and injection
//
// Design Decision: Builder with overridable dependencies
//
// Rationale: the binary wires the store adapter named by GatewayConfig, while
// tests inject a prepared InMemoryStore (or any StoreProvider) and short
// deadlines without touching the environment.
//
// Usage Example:
//     // Production
//     let api = AppBuilder::new()
//         .with_config(GatewayConfig::from_env()?)
//         .build_async()
//         .await?;
//
//     // Testing
//     let store = InMemoryStore::new();
//     let api = AppBuilder::new()
//         .with_store_provider(Arc::new(store.clone()))
//         .build()?;

use crate::api::GatewayApi;
use crate::error::{GatewayError, Result};
use crate::pipeline::{ExecutorSettings, OutcomeExecutor};
use crate::services::{GatewayConfig, InMemoryStore, RestStoreProvider, StoreBackend, StoreProvider};
use std::sync::Arc;

/// Builder for constructing a `GatewayApi`
pub struct AppBuilder {
    config: GatewayConfig,

    // Optional overrides (for testing)
    store_provider: Option<Arc<dyn StoreProvider>>,
    executor_settings: Option<ExecutorSettings>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Create a builder with default configuration (in-memory store)
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            store_provider: None,
            executor_settings: None,
        }
    }

    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the record store (for testing)
    pub fn with_store_provider(mut self, provider: Arc<dyn StoreProvider>) -> Self {
        self.store_provider = Some(provider);
        self
    }

    /// Override deadlines and simulation mode (for testing)
    pub fn with_executor_settings(mut self, settings: ExecutorSettings) -> Self {
        self.executor_settings = Some(settings);
        self
    }

    /// Build without I/O
    ///
    /// # Errors
    /// - Configured seed file (needs `build_async`)
    /// - HTTP client construction failure
    pub fn build(self) -> Result<GatewayApi> {
        let provider = match self.store_provider.clone() {
            Some(provider) => provider,
            None => Self::provider_for(&self.config.store)?,
        };
        self.finish(provider)
    }

    /// Build, loading the in-memory seed file if one is configured
    ///
    /// # Errors
    /// - Seed file unreadable or malformed
    /// - HTTP client construction failure
    pub async fn build_async(self) -> Result<GatewayApi> {
        if self.store_provider.is_none() {
            if let StoreBackend::Memory {
                seed_file: Some(path),
            } = &self.config.store
            {
                let store = InMemoryStore::load_seed_file(path).await.map_err(|e| {
                    GatewayError::Config(format!("Failed to load seed file {:?}: {}", path, e))
                })?;
                return self.finish(Arc::new(store));
            }
        }
        self.build()
    }

    fn provider_for(backend: &StoreBackend) -> Result<Arc<dyn StoreProvider>> {
        match backend {
            StoreBackend::Memory { seed_file: None } => {
                tracing::info!("Using empty in-memory record store");
                Ok(Arc::new(InMemoryStore::new()))
            }
            StoreBackend::Memory {
                seed_file: Some(path),
            } => Err(GatewayError::Config(format!(
                "Seed file {:?} requires AppBuilder::build_async",
                path
            ))),
            StoreBackend::Rest { base_url, anon_key } => {
                tracing::info!("Using REST record store at {}", base_url);
                Ok(Arc::new(RestStoreProvider::new(base_url.clone(), anon_key.clone())?))
            }
        }
    }

    fn finish(self, provider: Arc<dyn StoreProvider>) -> Result<GatewayApi> {
        let settings = self
            .executor_settings
            .unwrap_or_else(|| ExecutorSettings::from(&self.config));
        let executor = Arc::new(OutcomeExecutor::new(settings)?);
        Ok(GatewayApi::new(provider, executor))
    }
}
