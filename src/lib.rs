// Library interface for Agent Gateway
// This exposes the core functionality as a library that can be:
// - Served over HTTP by the bundled binary
// - Called programmatically through GatewayApi
// - Driven from integration tests with an in-memory store

pub mod api;
pub mod app_builder;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod records;
pub mod server;
pub mod services; // Record store port, adapters and configuration
pub mod version;

// Re-export commonly used types for convenience
pub use api::GatewayApi;
pub use app_builder::AppBuilder;
pub use error::{GatewayError, Result};
pub use payload::{Parameters, Payload};
pub use pipeline::{
    ExecuteToolRequest, ExecuteToolResponse, ExecutionMode, ExecutorSettings,
    HealthCheckRequest, HealthCheckResponse, HealthClassification, OutcomeExecutor,
    ToolClassification,
};
pub use records::{Agent, AuditLogEntry, Link, LinkedAgent, ToolCapability};
pub use services::{GatewayConfig, InMemoryStore, RecordStore, RestStoreProvider, StoreProvider};
