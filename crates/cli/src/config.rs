//! Command-line and environment configuration.
//!
//! Every setting can be given as a flag or through its environment variable;
//! `.env` is loaded before parsing, so it can supply them too. Settings are
//! parsed once at startup and handed to the components that need them.

use std::{net::SocketAddr, time::Duration};

use clap::{Args, Parser, Subcommand};
use llm::{GeminiConfig, DEFAULT_BASE_URL};
use pipeline::{ModelId, PipelineError, PromptStyle, Temperature};

use crate::telemetry::LogFormat;

/// Four-stage research, summary, reasoning, and decision pipeline.
#[derive(Debug, Parser)]
#[command(name = "quartet", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// API key for the model provider. Calls fail with an authentication error when unset.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Hosted model identifier.
    #[arg(long, env = "QUARTET_MODEL", default_value = ModelId::DEFAULT, global = true)]
    pub model: String,

    /// Sampling temperature, 0.0 to 2.0.
    #[arg(long, env = "QUARTET_TEMPERATURE", default_value_t = Temperature::DEFAULT, global = true)]
    pub temperature: Temperature,

    /// Model provider API root.
    #[arg(long, env = "QUARTET_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-call timeout in seconds.
    #[arg(
        long,
        env = "QUARTET_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout_secs: u64,

    /// Prompt strategy: `generic` (chained) or `specialized` (query-grounded reasoning).
    #[arg(long, env = "QUARTET_PROMPT_STYLE", default_value_t = PromptStyle::Generic, global = true)]
    pub prompt_style: PromptStyle,

    /// Log output format.
    #[arg(long, env = "QUARTET_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for trace export. Export is off when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    pub otlp_endpoint: Option<String>,
}

impl Settings {
    /// Provider settings derived from these options.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the model identifier is empty.
    pub fn gemini_config(&self) -> Result<GeminiConfig, PipelineError> {
        let model = ModelId::new(self.model.trim())
            .ok_or_else(|| PipelineError::configuration("model identifier must not be empty"))?;
        let mut config = GeminiConfig::new(model)
            .with_base_url(self.base_url.clone())
            .with_temperature(self.temperature)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        config.api_key = self.api_key.clone();
        Ok(config)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTTP API and home page.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "QUARTET_BIND", default_value = "127.0.0.1:5050")]
        bind: SocketAddr,
    },

    /// Run the pipeline once and print the final answer.
    Ask {
        /// The question to answer.
        query: String,

        /// Print per-stage timings to stderr.
        #[arg(long, short)]
        verbose: bool,
    },
}
