//! Google Gemini provider.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{LlmProvider, ModelId, PipelineError, Prompt, Temperature};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::wire::{GenerateContentRequest, GenerateContentResponse};

/// Public Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Transport timeout applied to every call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Name of the environment variable that conventionally holds the key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upper bound on how much of an error body is copied into an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Settings for [`GeminiProvider`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key. `None` is accepted here and reported on the first call.
    pub api_key: Option<String>,
    /// Hosted model to call.
    pub model: ModelId,
    /// Sampling temperature for every call.
    pub temperature: Temperature,
    /// API root, without a trailing `/models/...` segment.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Default settings for `model`, with no API key.
    pub fn new(model: ModelId) -> Self {
        Self {
            api_key: None,
            model,
            temperature: Temperature::DEFAULT,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets a custom API root (e.g. a proxy or a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`LlmProvider`] backed by the Gemini `generateContent` endpoint.
///
/// The key travels in the `x-goog-api-key` header, never in the URL.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    endpoint: String,
}

impl GeminiProvider {
    /// Builds a provider. A missing API key is not an error here.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::configuration(format!("failed to build HTTP client: {e}")))?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_key(&self) -> Result<&str, PipelineError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PipelineError::Authentication {
                message: format!("{API_KEY_ENV} is not set"),
            }),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            PipelineError::Timeout {
                after: self.config.timeout,
            }
        } else if err.is_decode() {
            PipelineError::Provider {
                message: format!("invalid response body: {err}"),
            }
        } else {
            PipelineError::Provider {
                message: format!("request failed: {err}"),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    #[instrument(skip_all, fields(stage = %prompt.stage(), model = %self.config.model))]
    async fn generate(&self, prompt: &Prompt) -> Result<String, PipelineError> {
        let api_key = self.api_key()?;
        let body = GenerateContentRequest::from_prompt(prompt, self.config.temperature);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = status_error(status, &text);
            warn!(%status, error_kind = err.kind(), "model provider returned an error status");
            return Err(err);
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;
        let reason = parsed.refusal_reason();
        match parsed.into_text() {
            Some(text) => {
                debug!(response_chars = text.chars().count(), "model call succeeded");
                Ok(text)
            }
            None => Err(PipelineError::Provider {
                message: match reason {
                    Some(reason) => format!("response contained no text (reason: {reason})"),
                    None => "response contained no text".to_owned(),
                },
            }),
        }
    }

    fn model(&self) -> &ModelId {
        &self.config.model
    }
}

/// Maps a non-success HTTP status to the error taxonomy.
///
/// The endpoint reports a malformed key as `400 INVALID_ARGUMENT` with reason
/// `API_KEY_INVALID`, so that case is classed as an authentication failure too.
fn status_error(status: StatusCode, body: &str) -> PipelineError {
    let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    let invalid_key = status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID");

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) || invalid_key {
        PipelineError::Authentication {
            message: format!("HTTP {status}: {snippet}"),
        }
    } else {
        PipelineError::Provider {
            message: format!("HTTP {status}: {snippet}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ModelId {
        ModelId::new("gemini-2.0-flash").unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = GeminiConfig::new(model());
        assert!(config.api_key.is_none());
        assert_eq!(config.temperature, Temperature::DEFAULT);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = GeminiConfig::new(model()).with_api_key("secret-key-123");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key-123"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let provider = GeminiProvider::new(
            GeminiConfig::new(model()).with_base_url("https://proxy.example.com/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://proxy.example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(provider.model().as_str(), "gemini-2.0-flash");
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let provider = GeminiProvider::new(GeminiConfig::new(model()).with_api_key("  ")).unwrap();
        let err = provider.api_key().unwrap_err();
        assert_eq!(
            err,
            PipelineError::Authentication {
                message: "GOOGLE_API_KEY is not set".into()
            }
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_error(StatusCode::UNAUTHORIZED, "").kind(), "authentication");
        assert_eq!(status_error(StatusCode::FORBIDDEN, "denied").kind(), "authentication");
        assert_eq!(
            status_error(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#
            )
            .kind(),
            "authentication"
        );
        assert_eq!(status_error(StatusCode::BAD_REQUEST, "bad field").kind(), "provider");
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "quota").to_string(),
            "Model provider error: HTTP 429 Too Many Requests: quota"
        );
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS * 2);
        let PipelineError::Provider { message } = status_error(StatusCode::BAD_GATEWAY, &body)
        else {
            panic!("expected a provider error");
        };
        assert_eq!(message.matches('é').count(), MAX_ERROR_BODY_CHARS);
    }
}
