//! Quartet pipeline execution.
//!
//! This crate provides [`PipelineExecutor`], which drives one query through
//! the research, summary, reasoning, and decision stages.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The executor sequences calls between the prompt
//! strategies in the [`pipeline`] crate and an [`pipeline::LlmProvider`]
//! implementation. It contains no prompt text and no transport code of its own.

pub mod executor;

pub use executor::PipelineExecutor;
