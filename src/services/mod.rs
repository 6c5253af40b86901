// Service layer: persistence port, adapters and configuration
//
// Architecture Pattern: Ports and Adapters
// - RecordStore / StoreProvider are the ports the pipelines depend on
// - InMemoryStore and RestStore are the adapters
// - GatewayConfig selects which adapter the binary wires in

pub mod config;
pub mod error;
pub mod memory;
#[cfg(test)]
pub mod mocks;
pub mod rest;
pub mod traits;

// Re-export commonly used types
pub use config::{GatewayConfig, StoreBackend};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, StoreSeed};
pub use rest::{RestStore, RestStoreProvider};
#[cfg(test)]
pub use traits::MockRecordStore;
pub use traits::{RecordStore, StoreProvider};
