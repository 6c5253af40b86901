// Record store error types
//
// An empty result is NOT an error: lookups return `Ok(None)` for missing
// rows. `StoreError` means the store itself could not answer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure talking to the store
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store answered with a non-success status
    #[error("Store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Row could not be decoded into the expected record
    #[error("Store returned malformed data: {0}")]
    Decode(String),

    /// Seed file could not be read
    #[error("Seed file error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
