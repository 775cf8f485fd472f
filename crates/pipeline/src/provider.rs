//! The model-provider port.
//!
//! The pipeline only ever talks to a hosted model through [`LlmProvider`].
//! The `llm` crate supplies the production implementation; tests substitute
//! stubs that echo or transform their input.

use async_trait::async_trait;

use crate::{ModelId, PipelineError, Prompt};

/// A configured handle to a hosted text-generation model.
///
/// Implementations hold only immutable configuration, so one instance is
/// shared across concurrent requests behind an `Arc`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends `prompt` to the model and returns its raw text completion.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Authentication`] when credentials are absent or rejected.
    /// - [`PipelineError::Timeout`] when the call exceeds the transport timeout.
    /// - [`PipelineError::Provider`] for every other transport or service failure.
    async fn generate(&self, prompt: &Prompt) -> Result<String, PipelineError>;

    /// The model this provider sends requests to.
    fn model(&self) -> &ModelId;
}
