// Request pipelines
//
// Each request flows strictly through:
//   validation -> authorization -> executor -> recorder -> response
//
// Only validation and authorization can fail the request. Once the executor
// runs, the request always answers 200 and always records.

pub mod authorization;
pub mod executor;
pub mod health_check;
pub mod recorder;
pub mod response;
pub mod tool_execution;
pub mod validation;

pub use executor::{
    ExecutionMode, ExecutorSettings, HealthClassification, HealthOutcome, OutcomeError,
    OutcomeExecutor, ToolClassification, ToolOutcome,
};
pub use response::{ExecuteToolResponse, HealthCheckResponse};
pub use validation::{ExecuteToolRequest, HealthCheckRequest};
