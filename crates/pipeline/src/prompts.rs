//! Prompt strategies.
//!
//! A [`PromptStrategy`] turns a stage [`Role`] and its inputs into a
//! [`Prompt`]. Two strategies ship with Quartet and are selected per
//! deployment through [`PromptStyle`]:
//!
//! | Style | Strategy | Messages | Topology |
//! |-------|----------|----------|----------|
//! | `generic` | [`GenericPrompts`] | system `"You are a {role} agent."` + user input | [`Topology::Chained`] |
//! | `specialized` | [`SpecializedPrompts`] | one Arabic instruction per stage | [`Topology::QueryGrounded`] |
//!
//! Each strategy declares its own topology so the executor never has to
//! guess which inputs the reasoning stage expects.

use std::str::FromStr;
use std::sync::Arc;

use crate::{PipelineError, Prompt, PromptMessage, PromptTemplate, Role, Topology};

/// The text a stage acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInputs<'a> {
    /// The query for the research stage, otherwise the previous stage's output.
    pub text: &'a str,
    /// The original query. Supplied only to the reasoning stage of a
    /// [`Topology::QueryGrounded`] pipeline.
    pub query: Option<&'a str>,
}

impl<'a> StageInputs<'a> {
    /// Inputs consisting of the previous output alone.
    pub fn chained(text: &'a str) -> Self {
        Self { text, query: None }
    }

    /// Inputs carrying the previous output and the original query.
    pub fn grounded(text: &'a str, query: &'a str) -> Self {
        Self {
            text,
            query: Some(query),
        }
    }
}

/// Builds role-conditioned prompts for the four stages.
pub trait PromptStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Which inputs this strategy's reasoning stage consumes.
    fn topology(&self) -> Topology;

    /// Builds the prompt for `role`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the inputs do not satisfy the
    /// strategy's template (e.g. a query-grounded reasoning prompt without
    /// the query).
    fn build(&self, role: Role, inputs: &StageInputs<'_>) -> Result<Prompt, PipelineError>;
}

// ---------------------------------------------------------------------------
// Generic strategy
// ---------------------------------------------------------------------------

const GENERIC_INSTRUCTION: &str = "You are a {role} agent.";

/// A system instruction naming the role, followed by the input as the user message.
#[derive(Debug, Clone)]
pub struct GenericPrompts {
    instruction: PromptTemplate,
}

impl GenericPrompts {
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Propagates template parse failures.
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            instruction: PromptTemplate::parse(GENERIC_INSTRUCTION)?,
        })
    }
}

impl PromptStrategy for GenericPrompts {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn topology(&self) -> Topology {
        Topology::Chained
    }

    fn build(&self, role: Role, inputs: &StageInputs<'_>) -> Result<Prompt, PipelineError> {
        let instruction = self.instruction.render(&[("role", role.label())])?;
        Ok(Prompt::new(
            role,
            vec![
                PromptMessage::system(instruction),
                PromptMessage::user(inputs.text),
            ],
        ))
    }
}

// ---------------------------------------------------------------------------
// Specialized strategy
// ---------------------------------------------------------------------------

const RESEARCH_TEMPLATE: &str = "انت Research Agent . ابحث عن معلومة مبدئية للاجابة عن السؤال التالي:
{query}
اعطني نصوص خام للاجابة عن معلومات غير ملخصة";

const SUMMARY_TEMPLATE: &str = "انت Summarizer Agent. لخص النص التالي في نقاط اساسية :
{text}";

const REASONING_TEMPLATE: &str = "انت Reasoning Agent. بناء علي الملخص التالي :
{summary}
جاوب علي السؤال الاصلي : {query}
مع توضيح الاستنتاجات المهمة";

const DECISION_TEMPLATE: &str = "انت Decision Agent. صغ الاجابة التالية في شكل نهائي وواضح وسهل الفهم
{answer}";

/// Hand-authored Arabic instructions, one per stage, sent as a single message.
///
/// The reasoning prompt restates the original question, so this strategy
/// runs the [`Topology::QueryGrounded`] pipeline.
#[derive(Debug, Clone)]
pub struct SpecializedPrompts {
    research: PromptTemplate,
    summary: PromptTemplate,
    reasoning: PromptTemplate,
    decision: PromptTemplate,
}

impl SpecializedPrompts {
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Propagates template parse failures.
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            research: PromptTemplate::parse(RESEARCH_TEMPLATE)?,
            summary: PromptTemplate::parse(SUMMARY_TEMPLATE)?,
            reasoning: PromptTemplate::parse(REASONING_TEMPLATE)?,
            decision: PromptTemplate::parse(DECISION_TEMPLATE)?,
        })
    }
}

impl PromptStrategy for SpecializedPrompts {
    fn name(&self) -> &'static str {
        "specialized"
    }

    fn topology(&self) -> Topology {
        Topology::QueryGrounded
    }

    fn build(&self, role: Role, inputs: &StageInputs<'_>) -> Result<Prompt, PipelineError> {
        let text = match role {
            Role::Research => self.research.render(&[("query", inputs.text)])?,
            Role::Summary => self.summary.render(&[("text", inputs.text)])?,
            Role::Reasoning => {
                let query = inputs.query.ok_or_else(|| {
                    PipelineError::configuration(
                        "the specialized reasoning prompt requires the original query",
                    )
                })?;
                self.reasoning
                    .render(&[("summary", inputs.text), ("query", query)])?
            }
            Role::Decision => self.decision.render(&[("answer", inputs.text)])?,
        };
        Ok(Prompt::new(role, vec![PromptMessage::user(text)]))
    }
}

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// Deployment-level choice of prompt strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PromptStyle {
    /// [`GenericPrompts`].
    #[default]
    Generic,
    /// [`SpecializedPrompts`].
    Specialized,
}

impl PromptStyle {
    /// Instantiates the strategy for this style.
    ///
    /// # Errors
    ///
    /// Propagates template parse failures.
    pub fn strategy(self) -> Result<Arc<dyn PromptStrategy>, PipelineError> {
        Ok(match self {
            Self::Generic => Arc::new(GenericPrompts::new()?),
            Self::Specialized => Arc::new(SpecializedPrompts::new()?),
        })
    }
}

impl std::fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Generic => "generic",
            Self::Specialized => "specialized",
        })
    }
}

impl FromStr for PromptStyle {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "specialized" | "specialised" => Ok(Self::Specialized),
            other => Err(PipelineError::configuration(format!(
                "unknown prompt style '{other}' (expected 'generic' or 'specialized')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;
    use pretty_assertions::assert_eq;

    #[test]
    fn generic_prompt_is_instruction_plus_verbatim_input() {
        let prompts = GenericPrompts::new().unwrap();
        let prompt = prompts
            .build(Role::Decision, &StageInputs::chained("  raw {text}\n"))
            .unwrap();

        assert_eq!(prompt.stage(), Role::Decision);
        assert_eq!(
            prompt.messages(),
            &[
                PromptMessage::system("You are a decision_making agent."),
                PromptMessage::user("  raw {text}\n"),
            ]
        );
    }

    #[test]
    fn generic_prompt_ignores_grounding_query() {
        let prompts = GenericPrompts::new().unwrap();
        let prompt = prompts
            .build(Role::Reasoning, &StageInputs::grounded("summary", "question"))
            .unwrap();
        assert_eq!(prompt.user_content().as_deref(), Some("summary"));
        assert_eq!(prompts.topology(), Topology::Chained);
    }

    #[test]
    fn specialized_prompts_are_single_user_messages() {
        let prompts = SpecializedPrompts::new().unwrap();
        for role in Role::ALL {
            let prompt = prompts
                .build(role, &StageInputs::grounded("INPUT", "QUERY"))
                .unwrap();
            assert_eq!(prompt.messages().len(), 1);
            assert_eq!(prompt.messages()[0].role, MessageRole::User);
            let body = &prompt.messages()[0].content;
            assert!(body.contains(role.agent_name()), "{role}: {body}");
            assert!(body.contains("INPUT"), "{role}: {body}");
        }
    }

    #[test]
    fn specialized_reasoning_restates_the_query() {
        let prompts = SpecializedPrompts::new().unwrap();
        let prompt = prompts
            .build(Role::Reasoning, &StageInputs::grounded("- point", "ما هو X؟"))
            .unwrap();
        let body = prompt.user_content().unwrap();
        assert!(body.contains("- point"));
        assert!(body.contains("ما هو X؟"));
        assert!(body.find("- point") < body.find("ما هو X؟"));
        assert_eq!(prompts.topology(), Topology::QueryGrounded);
    }

    #[test]
    fn specialized_reasoning_without_query_is_rejected() {
        let prompts = SpecializedPrompts::new().unwrap();
        let err = prompts
            .build(Role::Reasoning, &StageInputs::chained("summary"))
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn injected_placeholders_stay_literal() {
        let prompts = SpecializedPrompts::new().unwrap();
        let prompt = prompts
            .build(Role::Reasoning, &StageInputs::grounded("{query}", "{summary}"))
            .unwrap();
        let body = prompt.user_content().unwrap();
        assert_eq!(body.matches("{query}").count(), 1);
        assert_eq!(body.matches("{summary}").count(), 1);
    }

    #[test]
    fn prompt_style_parses_and_selects_strategy() {
        assert_eq!("generic".parse::<PromptStyle>().unwrap(), PromptStyle::Generic);
        assert_eq!(" Specialized ".parse::<PromptStyle>().unwrap(), PromptStyle::Specialized);
        assert!("arabic".parse::<PromptStyle>().is_err());
        assert_eq!(PromptStyle::default().to_string(), "generic");

        let strategy = PromptStyle::Specialized.strategy().unwrap();
        assert_eq!(strategy.name(), "specialized");
        assert_eq!(strategy.topology(), Topology::QueryGrounded);
    }
}
