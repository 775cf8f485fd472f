//! HTTP rendering of pipeline errors.
//!
//! Validation failures are returned to the caller as-is. Everything else is
//! logged in full and replaced with a fixed, generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// JSON body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Message safe to show to the caller.
    pub error: String,
}

/// A [`PipelineError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(PipelineError);

impl ApiError {
    /// Status code for the wrapped error.
    ///
    /// | Error | Status |
    /// |-------|--------|
    /// | `Validation` | 400 |
    /// | `Timeout` | 504 |
    /// | `Authentication`, `Provider` | 502 |
    /// | `Configuration` | 500 |
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::Validation { .. } => StatusCode::BAD_REQUEST,
            PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Authentication { .. } | PipelineError::Provider { .. } => {
                StatusCode::BAD_GATEWAY
            }
            PipelineError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body.
    pub fn public_message(&self) -> String {
        match &self.0 {
            PipelineError::Validation { message } => message.clone(),
            PipelineError::Timeout { .. } => "the language model did not respond in time".into(),
            PipelineError::Authentication { .. } | PipelineError::Provider { .. } => {
                "the language model request failed".into()
            }
            PipelineError::Configuration { .. } => "internal server error".into(),
        }
    }

    /// The wrapped error.
    pub fn inner(&self) -> &PipelineError {
        &self.0
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error_kind = self.0.kind(), error = %self.0, "request failed");
        } else {
            info!(%status, error_kind = self.0.kind(), "request rejected");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
