//! The pipeline executor.
//!
//! Runs the four stages strictly in order, building each prompt through the
//! configured [`PromptStrategy`] and sending it through the [`LlmProvider`].
//! Each stage's output is moved into the next stage's inputs. The first
//! failure ends the run; earlier outputs are dropped with it.

use std::sync::Arc;

use pipeline::{
    LlmProvider, ModelId, PipelineError, PipelineResult, PipelineRunId, PromptStrategy, Query,
    Role, StageInputs, StageOutput, StageRecord, Timestamp, Topology,
};
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, Instrument};

/// Sequences research → summary → reasoning → decision for one query.
///
/// Holds only shared, immutable handles; one executor serves every request.
#[derive(Clone)]
pub struct PipelineExecutor {
    provider: Arc<dyn LlmProvider>,
    strategy: Arc<dyn PromptStrategy>,
}

impl PipelineExecutor {
    /// Creates an executor over `provider` using `strategy` for every prompt.
    pub fn new(provider: Arc<dyn LlmProvider>, strategy: Arc<dyn PromptStrategy>) -> Self {
        Self { provider, strategy }
    }

    /// The model every stage is sent to.
    pub fn model(&self) -> &ModelId {
        self.provider.model()
    }

    /// The reasoning-stage topology, as declared by the prompt strategy.
    pub fn topology(&self) -> Topology {
        self.strategy.topology()
    }

    /// Name of the prompt strategy in use.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Runs all four stages for `query` and returns the decision stage's output.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by prompt construction or the provider,
    /// unchanged. No partial output is returned.
    pub async fn run(&self, query: &Query) -> Result<PipelineResult, PipelineError> {
        let run_id = PipelineRunId::new_random();
        let span = info_span!(
            "pipeline_run",
            %run_id,
            model = %self.provider.model(),
            strategy = self.strategy.name(),
            topology = %self.topology()
        );
        self.run_stages(run_id, query).instrument(span).await
    }

    async fn run_stages(
        &self,
        run_id: PipelineRunId,
        query: &Query,
    ) -> Result<PipelineResult, PipelineError> {
        let clock = Instant::now();
        let mut stages = Vec::with_capacity(Role::ALL.len());

        let research = self
            .run_stage(Role::Research, StageInputs::chained(query.as_str()), &mut stages)
            .await?;

        let summary = self
            .run_stage(Role::Summary, StageInputs::chained(research.as_str()), &mut stages)
            .await?;

        let reasoning_inputs = match self.topology() {
            Topology::Chained => StageInputs::chained(summary.as_str()),
            Topology::QueryGrounded => StageInputs::grounded(summary.as_str(), query.as_str()),
        };
        let reasoning = self
            .run_stage(Role::Reasoning, reasoning_inputs, &mut stages)
            .await?;

        let answer = self
            .run_stage(Role::Decision, StageInputs::chained(reasoning.as_str()), &mut stages)
            .await?;

        info!(total_ms = elapsed_ms(clock), "pipeline completed");

        Ok(PipelineResult {
            run_id,
            query: query.clone(),
            answer,
            stages,
        })
    }

    async fn run_stage(
        &self,
        role: Role,
        inputs: StageInputs<'_>,
        records: &mut Vec<StageRecord>,
    ) -> Result<StageOutput, PipelineError> {
        info!(stage = %role, "{} agent running", role.agent_name());

        let prompt = self.strategy.build(role, &inputs)?;
        let started_at = Timestamp::now();
        let clock = Instant::now();

        let text = self.provider.generate(&prompt).await.map_err(|err| {
            error!(stage = %role, error_kind = err.kind(), error = %err, "stage failed");
            err
        })?;

        let output = StageOutput::new(text);
        let elapsed_ms = elapsed_ms(clock);
        debug!(
            stage = %role,
            elapsed_ms,
            output_chars = output.char_count(),
            "stage completed"
        );

        records.push(StageRecord {
            role,
            started_at,
            elapsed_ms,
            output_chars: output.char_count(),
        });
        Ok(output)
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("model", self.provider.model())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pipeline::{GenericPrompts, Prompt, SpecializedPrompts};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Test double: answers with a function of the prompt and records every call.
    struct StubProvider {
        model: ModelId,
        calls: Mutex<Vec<Prompt>>,
        respond: Box<dyn Fn(&Prompt) -> Result<String, PipelineError> + Send + Sync>,
    }

    impl StubProvider {
        fn new(
            respond: impl Fn(&Prompt) -> Result<String, PipelineError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                model: ModelId::new("stub-model").unwrap(),
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            })
        }

        /// Echoes `"<role>:<user content>"`.
        fn role_echo() -> Arc<Self> {
            Self::new(|prompt| {
                Ok(format!(
                    "{}:{}",
                    prompt.stage().label(),
                    prompt.user_content().unwrap_or_default()
                ))
            })
        }

        fn calls(&self) -> Vec<Prompt> {
            self.calls.lock().unwrap().clone()
        }

        fn stages_called(&self) -> Vec<Role> {
            self.calls().iter().map(Prompt::stage).collect()
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn generate(&self, prompt: &Prompt) -> Result<String, PipelineError> {
            self.calls.lock().unwrap().push(prompt.clone());
            (self.respond)(prompt)
        }

        fn model(&self) -> &ModelId {
            &self.model
        }
    }

    fn generic(provider: Arc<StubProvider>) -> PipelineExecutor {
        PipelineExecutor::new(provider, Arc::new(GenericPrompts::new().unwrap()))
    }

    fn specialized(provider: Arc<StubProvider>) -> PipelineExecutor {
        PipelineExecutor::new(provider, Arc::new(SpecializedPrompts::new().unwrap()))
    }

    fn query(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    #[tokio::test]
    async fn stages_thread_outputs_in_fixed_order() {
        let provider = StubProvider::role_echo();
        let executor = generic(provider.clone());

        let result = executor.run(&query("Q")).await.unwrap();

        assert_eq!(
            result.answer.as_str(),
            "decision_making:reasoning:summary:research:Q"
        );
        assert_eq!(result.query.as_str(), "Q");
        assert_eq!(provider.stages_called(), Role::ALL.to_vec());
    }

    #[tokio::test]
    async fn identity_model_returns_the_query_unchanged() {
        let provider = StubProvider::new(|prompt| Ok(prompt.user_content().unwrap_or_default()));
        let executor = generic(provider.clone());

        let result = executor.run(&query("What is X?")).await.unwrap();

        assert_eq!(result.answer.as_str(), "What is X?");
        assert_eq!(provider.calls().len(), 4);
    }

    #[tokio::test]
    async fn each_stage_receives_exactly_the_previous_output() {
        let provider = StubProvider::new(|prompt| Ok(format!("out-{}", prompt.stage().label())));
        let executor = generic(provider.clone());

        executor.run(&query("start")).await.unwrap();

        let inputs: Vec<String> = provider
            .calls()
            .iter()
            .map(|p| p.user_content().unwrap())
            .collect();
        assert_eq!(
            inputs,
            ["start", "out-research", "out-summary", "out-reasoning"]
        );
    }

    #[tokio::test]
    async fn failure_in_second_stage_aborts_without_partial_output() {
        let provider = StubProvider::new(|prompt| match prompt.stage() {
            Role::Summary => Err(PipelineError::Provider {
                message: "quota exhausted".into(),
            }),
            role => Ok(format!("{role} output")),
        });
        let executor = generic(provider.clone());

        let err = executor.run(&query("Q")).await.unwrap_err();

        assert_eq!(
            err,
            PipelineError::Provider {
                message: "quota exhausted".into()
            }
        );
        assert_eq!(provider.stages_called(), [Role::Research, Role::Summary]);
        assert!(!err.to_string().contains("research output"));
    }

    #[tokio::test]
    async fn authentication_failure_repeats_identically() {
        let provider = StubProvider::new(|_| {
            Err(PipelineError::Authentication {
                message: "no API key configured".into(),
            })
        });
        let executor = generic(provider.clone());

        let first = executor.run(&query("Q")).await.unwrap_err();
        let second = executor.run(&query("Q")).await.unwrap_err();

        assert_eq!(first, second);
        assert_eq!(first.kind(), "authentication");
        assert_eq!(provider.stages_called(), [Role::Research, Role::Research]);
    }

    #[tokio::test]
    async fn specialized_pipeline_grounds_reasoning_in_the_query() {
        let provider = StubProvider::new(|prompt| Ok(format!("<{}>", prompt.stage().label())));
        let executor = specialized(provider.clone());
        assert_eq!(executor.topology(), Topology::QueryGrounded);

        let result = executor.run(&query("ما هو X؟")).await.unwrap();
        assert_eq!(result.answer.as_str(), "<decision_making>");

        let bodies: Vec<String> = provider
            .calls()
            .iter()
            .map(|p| p.user_content().unwrap())
            .collect();
        assert!(bodies[0].contains("ما هو X؟"));
        assert!(bodies[1].contains("<research>"));
        assert!(bodies[2].contains("<summary>"));
        assert!(bodies[2].contains("ما هو X؟"));
        assert!(bodies[3].contains("<reasoning>"));
    }

    #[tokio::test]
    async fn generic_pipeline_does_not_resend_the_query_to_reasoning() {
        let provider = StubProvider::new(|prompt| Ok(format!("<{}>", prompt.stage().label())));
        let executor = generic(provider.clone());
        assert_eq!(executor.topology(), Topology::Chained);

        executor.run(&query("unique-query-text")).await.unwrap();

        let reasoning = &provider.calls()[2];
        assert_eq!(reasoning.stage(), Role::Reasoning);
        assert_eq!(reasoning.user_content().as_deref(), Some("<summary>"));
    }

    #[tokio::test]
    async fn result_records_every_stage() {
        let provider = StubProvider::new(|_| Ok("four".into()));
        let executor = generic(provider);

        let result = executor.run(&query("Q")).await.unwrap();

        let roles: Vec<Role> = result.stages.iter().map(|s| s.role).collect();
        assert_eq!(roles, Role::ALL.to_vec());
        assert!(result.stages.iter().all(|s| s.output_chars == 4));
        assert!(result
            .stages
            .windows(2)
            .all(|w| w[0].started_at <= w[1].started_at));
    }

    #[test]
    fn exposes_configuration_for_health_reporting() {
        let executor = generic(StubProvider::role_echo());
        assert_eq!(executor.model().as_str(), "stub-model");
        assert_eq!(executor.strategy_name(), "generic");
        assert!(format!("{executor:?}").contains("stub-model"));
    }
}
