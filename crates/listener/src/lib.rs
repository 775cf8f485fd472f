//! Quartet HTTP surface.
//!
//! | Route | Handler | Notes |
//! |-------|---------|-------|
//! | `GET /` | [`routes::home`] | Static page with a query form |
//! | `GET /health` | [`routes::health`] | Model and prompt style in use |
//! | `POST /ask` | [`routes::ask`] | `{"query"}` → `{"query", "answer"}` |
//!
//! Each `/ask` request runs the four stages to completion before the response
//! is written. Concurrent requests share one [`nodes::PipelineExecutor`] and
//! never share mutable state.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, body parsing, and status-code mapping live
//! here. The [`pipeline`] crate never sees HTTP types.

pub mod error;
pub mod routes;

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use nodes::PipelineExecutor;
use tokio::net::TcpListener;
use tracing::info;

pub use error::{ApiError, ErrorBody};
pub use routes::{AppState, AskResponse, HealthResponse};

/// Builds the router with every route bound to `executor`.
pub fn router(executor: Arc<PipelineExecutor>) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/ask", post(routes::ask))
        .with_state(AppState { executor })
}

/// Binds `addr` and serves `router` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown` fires.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
