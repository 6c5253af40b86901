// HTTP error responses
//
// Design Decision: Only validation and not-found errors carry their message;
// everything else is logged and answered with a fixed 500 body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Message returned for every 500
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error response body: `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP-facing error
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    /// Generic 500; the detail belongs in server logs only
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        if err.is_validation() {
            Self::new(StatusCode::BAD_REQUEST, err.to_string())
        } else if err.is_not_found() {
            Self::new(StatusCode::NOT_FOUND, err.to_string())
        } else {
            tracing::error!("Request failed: {}", err);
            Self::internal()
        }
    }
}
