//! Request and response bodies for the `generateContent` endpoint.
//!
//! Only the fields Quartet reads or writes are modelled; unknown response
//! fields are ignored.

use pipeline::{Prompt, Temperature};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// System messages become the `systemInstruction`; user messages become
    /// `contents`. A prompt with no user message sends its instruction as the
    /// sole user turn, since the endpoint rejects empty `contents`.
    pub fn from_prompt(prompt: &Prompt, temperature: Temperature) -> Self {
        let system = prompt.system_instruction();
        let (contents, system_instruction) = match prompt.user_content() {
            Some(user) => (vec![Content::user(user)], system.map(Content::instruction)),
            None => (
                vec![Content::user(system.unwrap_or_default())],
                None,
            ),
        };
        Self {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: temperature.as_f32(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: Some("user".to_owned()),
            parts: vec![Part { text: Some(text) }],
        }
    }

    fn instruction(text: String) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with its parts concatenated.
    ///
    /// Returns `None` when there is no candidate or it carries no text.
    pub fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why the provider returned no text, if it said.
    pub fn refusal_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.candidates.first().and_then(|c| c.finish_reason.clone()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}
