//! Core domain for Quartet, a four-stage research → summary → reasoning →
//! decision text pipeline.
//!
//! This crate contains every domain concept, value type, and the error type
//! shared by the rest of the workspace, plus the [`LlmProvider`] port and the
//! prompt strategies. Infrastructure crates implement the traits defined here;
//! they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtypes (`Query`, `ModelId`, `PipelineRunId`) |
//! | [`types`] | Stage roles, prompts, outputs, results, `Temperature` |
//! | [`errors`] | [`PipelineError`] |
//! | [`provider`] | The [`LlmProvider`] port |
//! | [`template`] | Named-field prompt templates |
//! | [`prompts`] | [`PromptStrategy`] and the generic/specialized strategies |

pub mod errors;
pub mod identifiers;
pub mod prompts;
pub mod provider;
pub mod template;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PipelineError, MISSING_QUERY_MESSAGE};
pub use identifiers::{ModelId, PipelineRunId, Query};
pub use prompts::{GenericPrompts, PromptStrategy, PromptStyle, SpecializedPrompts, StageInputs};
pub use provider::LlmProvider;
pub use template::PromptTemplate;
pub use types::{
    MessageRole, PipelineResult, Prompt, PromptMessage, Role, StageOutput, StageRecord,
    Temperature, Timestamp, Topology,
};
