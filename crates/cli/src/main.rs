//! Quartet CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `.env`, then read flags and environment
//!    variables into [`config::Settings`]. Invalid values stop the process
//!    before anything else starts.
//! 2. **Wire observability**: install the `tracing-subscriber` stack, with an
//!    OpenTelemetry OTLP exporter when an endpoint is configured. All spans and
//!    events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: build the [`llm::GeminiProvider`] and the
//!    selected prompt strategy and inject them into a
//!    [`nodes::PipelineExecutor`].
//! 4. **Run the selected command**:
//!    - `serve` runs the HTTP surface from the `listener` crate until Ctrl-C.
//!    - `ask` runs the pipeline once and prints the final answer to stdout.

mod config;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use llm::GeminiProvider;
use nodes::PipelineExecutor;
use pipeline::{PipelineError, PipelineResult, Query};
use tracing::{info, warn};

use crate::config::{Cli, Command, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let _telemetry = telemetry::init(cli.settings.log_format, cli.settings.otlp_endpoint.as_deref())
        .context("failed to initialise telemetry")?;

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "failed to load .env file");
        }
    }

    let executor = build_executor(&cli.settings)?;

    match cli.command {
        Command::Serve { bind } => serve(bind, executor).await,
        Command::Ask { query, verbose } => ask(&executor, &query, verbose).await,
    }
}

fn build_executor(settings: &Settings) -> anyhow::Result<PipelineExecutor> {
    let gemini = settings.gemini_config()?;
    if gemini.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
        warn!("GOOGLE_API_KEY is not set; every model call will fail with an authentication error");
    }

    info!(
        model = %gemini.model,
        temperature = %gemini.temperature,
        timeout_secs = gemini.timeout.as_secs(),
        prompt_style = %settings.prompt_style,
        "configured pipeline"
    );

    let provider = GeminiProvider::new(gemini)?;
    let strategy = settings.prompt_style.strategy()?;
    Ok(PipelineExecutor::new(Arc::new(provider), strategy))
}

async fn serve(bind: SocketAddr, executor: PipelineExecutor) -> anyhow::Result<()> {
    let router = listener::router(Arc::new(executor));
    listener::serve(bind, router, shutdown_signal())
        .await
        .with_context(|| format!("server on {bind} failed"))
}

async fn ask(executor: &PipelineExecutor, query: &str, verbose: bool) -> anyhow::Result<()> {
    let query = Query::new(query).ok_or_else(PipelineError::missing_query)?;
    let result = executor.run(&query).await?;
    if verbose {
        print_stage_table(&result);
    }
    println!("Final Answer: {}", result.answer.as_str());
    Ok(())
}

fn print_stage_table(result: &PipelineResult) {
    eprintln!("run {}", result.run_id);
    eprintln!("{:<16} {:>10} {:>8}", "stage", "elapsed_ms", "chars");
    for stage in &result.stages {
        eprintln!(
            "{:<16} {:>10} {:>8}",
            stage.role.label(),
            stage.elapsed_ms,
            stage.output_chars
        );
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C; graceful shutdown is unavailable");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
