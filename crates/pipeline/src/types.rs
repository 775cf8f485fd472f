//! Shared value types for the Quartet pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (a temperature is finite and in range, a [`Role`] is one of four
//! fixed stages) or describe the shape of data moving between stages.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PipelineError, PipelineRunId, Query};

// ---------------------------------------------------------------------------
// Stage roles
// ---------------------------------------------------------------------------

/// One of the four fixed pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Gathers raw preliminary material for the query.
    Research,
    /// Condenses the research into key points.
    Summary,
    /// Answers the question from the summary.
    Reasoning,
    /// Restates the answer in its final, reader-facing form.
    Decision,
}

impl Role {
    /// Every role in the order the pipeline runs them.
    pub const ALL: [Role; 4] = [Role::Research, Role::Summary, Role::Reasoning, Role::Decision];

    /// Label interpolated into the generic `"You are a {role} agent."` prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Summary => "summary",
            Self::Reasoning => "reasoning",
            Self::Decision => "decision_making",
        }
    }

    /// Display name used in progress output and the specialized templates.
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Summary => "Summarizer",
            Self::Reasoning => "Reasoning",
            Self::Decision => "Decision",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Pipeline topology
// ---------------------------------------------------------------------------

/// Which inputs the reasoning stage receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Every stage sees only the previous stage's output.
    Chained,
    /// Like [`Topology::Chained`], except the reasoning stage also receives
    /// the original query alongside the summary.
    QueryGrounded,
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Chained => "chained",
            Self::QueryGrounded => "query_grounded",
        })
    }
}

// ---------------------------------------------------------------------------
// Prompt messages
// ---------------------------------------------------------------------------

/// Who a [`PromptMessage`] is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Instruction framing for the model.
    System,
    /// Content the model is asked to act on.
    User,
}

/// A single role-tagged message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Message attribution.
    pub role: MessageRole,
    /// Message text, passed to the provider verbatim.
    pub content: String,
}

impl PromptMessage {
    /// Creates a system instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// The ordered messages for one stage, tagged with the stage that built them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    stage: Role,
    messages: Vec<PromptMessage>,
}

impl Prompt {
    /// Creates a prompt. Message order is preserved exactly.
    pub fn new(stage: Role, messages: Vec<PromptMessage>) -> Self {
        Self { stage, messages }
    }

    /// The stage this prompt was built for.
    pub fn stage(&self) -> Role {
        self.stage
    }

    /// All messages in order.
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    /// Concatenated system instructions, or `None` if there are none.
    pub fn system_instruction(&self) -> Option<String> {
        self.joined(MessageRole::System)
    }

    /// Concatenated user content, or `None` if there is none.
    pub fn user_content(&self) -> Option<String> {
        self.joined(MessageRole::User)
    }

    fn joined(&self, role: MessageRole) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == role)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

// ---------------------------------------------------------------------------
// Stage outputs and results
// ---------------------------------------------------------------------------

/// Free-form text produced by the model for one stage.
///
/// Moved into the next stage's prompt and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput(String);

impl StageOutput {
    /// Wraps raw model text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the output, returning the owned text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Timing and size metadata for one completed stage. Never holds the output itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// The stage that ran.
    pub role: Role,
    /// When the model call was issued.
    pub started_at: Timestamp,
    /// Wall-clock duration of the model call in milliseconds.
    pub elapsed_ms: u64,
    /// Length of the stage output in characters.
    pub output_chars: usize,
}

/// The outcome of a successful run: the decision stage's output paired with the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Correlation identifier of the run.
    pub run_id: PipelineRunId,
    /// The query that started the run.
    pub query: Query,
    /// Output of the decision stage.
    pub answer: StageOutput,
    /// One record per stage, in execution order.
    pub stages: Vec<StageRecord>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Sampling temperature sent with every model call.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Temperature(f32);

impl Temperature {
    /// Low-variance default used by every stage.
    pub const DEFAULT: Temperature = Temperature(0.3);

    /// Upper bound accepted by the hosted model.
    pub const MAX: f32 = 2.0;

    /// Creates a [`Temperature`], returning `None` if `value` is not finite
    /// or outside `[0.0, 2.0]`.
    #[must_use]
    pub fn new(value: f32) -> Option<Self> {
        if value.is_finite() && (0.0..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the underlying value.
    pub fn as_f32(self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Temperature {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f32 = s
            .trim()
            .parse()
            .map_err(|_| PipelineError::configuration(format!("temperature '{s}' is not a number")))?;
        Self::new(value).ok_or_else(|| {
            PipelineError::configuration(format!(
                "temperature {value} is outside the range 0.0..={}",
                Self::MAX
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
