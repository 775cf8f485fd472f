//! Quartet LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for Google's Gemini
//! `generateContent` REST endpoint. Additional providers are added as new
//! modules in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing,
//! and the mapping of transport failures onto [`pipeline::PipelineError`] live
//! here. The [`pipeline`] crate sees only [`pipeline::LlmProvider`].
//!
//! ## Error mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | No API key configured | `Authentication` (raised per call, never at construction) |
//! | HTTP 401 / 403, or 400 with `API_KEY_INVALID` | `Authentication` |
//! | Transport timeout | `Timeout` |
//! | Any other status, transport, or decode failure; no candidate text | `Provider` |
//!
//! Nothing is retried.

pub mod gemini;
mod wire;

pub use gemini::{GeminiConfig, GeminiProvider, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
