//! Route handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{Html, IntoResponse},
    Json,
};
use nodes::PipelineExecutor;
use pipeline::{PipelineError, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;

const HOME_PAGE: &str = include_str!("../static/index.html");

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The executor every `/ask` request runs through.
    pub executor: Arc<PipelineExecutor>,
}

/// Successful response of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    /// The query as received.
    pub query: String,
    /// Output of the decision stage.
    pub answer: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Model every stage is sent to.
    pub model: String,
    /// Prompt strategy in use.
    pub prompt_style: String,
}

/// `GET /`
pub async fn home() -> impl IntoResponse {
    Html(HOME_PAGE)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        model: state.executor.model().to_string(),
        prompt_style: state.executor.strategy_name().into(),
    })
}

/// `POST /ask`
///
/// Runs the full pipeline before responding. A body that is not JSON, lacks
/// `query`, or carries an empty or non-string `query` is rejected before any
/// model call.
pub async fn ask(State(state): State<AppState>, body: Bytes) -> Result<Json<AskResponse>, ApiError> {
    let query = parse_query(&body)?;
    let result = state.executor.run(&query).await?;

    info!(
        run_id = %result.run_id,
        query_chars = query.as_str().chars().count(),
        answer_chars = result.answer.char_count(),
        "answered query"
    );

    Ok(Json(AskResponse {
        query: result.query.as_str().to_owned(),
        answer: result.answer.into_string(),
    }))
}

fn parse_query(body: &[u8]) -> Result<Query, PipelineError> {
    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    request
        .get("query")
        .and_then(Value::as_str)
        .and_then(Query::new)
        .ok_or_else(PipelineError::missing_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_field() {
        let query = parse_query(br#"{"query": "What is X?", "extra": 1}"#).unwrap();
        assert_eq!(query.as_str(), "What is X?");
    }

    #[test]
    fn rejects_missing_empty_and_malformed_queries() {
        let bodies: [&[u8]; 7] = [
            br#"{"query": ""}"#,
            br#"{}"#,
            br#"{"query": null}"#,
            br#"{"query": 42}"#,
            br#"["query"]"#,
            b"query=hello",
            b"",
        ];
        for body in bodies {
            let err = parse_query(body).unwrap_err();
            assert_eq!(err, PipelineError::missing_query(), "{:?}", String::from_utf8_lossy(body));
        }
    }
}
