//! Error taxonomy for the Quartet pipeline.
//!
//! [`PipelineError`] is the single error type that crosses crate boundaries.
//! Validation failures are raised by request handlers before any model call.
//! Authentication, provider, and timeout failures originate in an
//! [`crate::LlmProvider`] implementation and are never caught inside the
//! pipeline: the first one aborts the run and reaches the caller unchanged.

use std::time::Duration;

use thiserror::Error;

/// The message returned to callers that submit an empty or missing query.
pub const MISSING_QUERY_MESSAGE: &str = "please provide a query";

/// Errors produced while validating a request or running the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The caller's input was rejected before the pipeline started.
    ///
    /// Produced by: request handlers when the query is missing or empty.
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable description, safe to show to the caller.
        message: String,
    },

    /// The model provider rejected or never received usable credentials.
    ///
    /// Produced by: the provider when no API key is configured, or when the
    /// provider answers with an authentication failure.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Description of the credential problem.
        message: String,
    },

    /// Any transport, quota, or service failure reported by the model provider.
    #[error("Model provider error: {message}")]
    Provider {
        /// Description of the failure, including the HTTP status when known.
        message: String,
    },

    /// The model call did not complete within the configured timeout.
    #[error("Model call timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },

    /// Configuration is invalid, or a prompt template could not be rendered.
    ///
    /// Produced at startup for bad settings; the pipeline never starts with an
    /// invalid configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl PipelineError {
    /// The validation error for an empty or absent query.
    pub fn missing_query() -> Self {
        Self::Validation {
            message: MISSING_QUERY_MESSAGE.to_owned(),
        }
    }

    /// Convenience constructor for [`PipelineError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Stable machine-readable tag used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Authentication { .. } => "authentication",
            Self::Provider { .. } => "provider",
            Self::Timeout { .. } => "timeout",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Returns `true` for failures raised by the model provider.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Provider { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_carries_the_public_message() {
        let err = PipelineError::missing_query();
        assert_eq!(
            err,
            PipelineError::Validation {
                message: "please provide a query".into()
            }
        );
        assert_eq!(err.kind(), "validation");
        assert!(!err.is_model_failure());
    }

    #[test]
    fn model_failures_are_classified() {
        let timeout = PipelineError::Timeout {
            after: Duration::from_secs(5),
        };
        assert!(timeout.is_model_failure());
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(timeout.to_string(), "Model call timed out after 5s");

        let config = PipelineError::configuration("bad temperature");
        assert!(!config.is_model_failure());
        assert_eq!(config.to_string(), "Configuration error: bad temperature");
    }
}
