//! Newtype domain identifiers.
//!
//! A query and a model identifier are both strings under the hood, but they
//! are never interchangeable: a [`Query`] is user input that is threaded into
//! prompts, a [`ModelId`] selects the hosted model. Each gets its own type so
//! one cannot be passed where the other is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new value, returning `None` if it is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The user's question. Never empty.
    ///
    /// Created once at request ingress and only ever read afterwards. Only the
    /// empty string is rejected; whitespace is passed through to the model
    /// untouched.
    Query
}

string_id! {
    /// Identifies a hosted model version (e.g. `"gemini-2.0-flash"`).
    ModelId
}

impl ModelId {
    /// The model used when no override is configured.
    pub const DEFAULT: &'static str = "gemini-2.0-flash";
}

// ---------------------------------------------------------------------------
// UUID-backed identifiers (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline run (one query through all four stages).
///
/// Generated fresh for every run and recorded on the run's tracing span so
/// the four model calls of one request can be correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
