//! # Compass Stages
//!
//! The six inference stages and the contract they share.
//!
//! ## Architecture
//!
//! ```text
//! Stage (object-safe, used by the Coordinator)
//!   └── blanket impl over StageContract
//!         ├── render prompt from declared inputs   (prompts, context)
//!         ├── one ReasoningService call            (llm)
//!         ├── extract + validate JSON              (parse)
//!         └── fallback record on any failure
//! ```
//!
//! A stage never surfaces service or parsing failures; it stores its
//! fallback record instead. Only programming errors (`StageError`) escape.

pub mod context;
pub mod parse;
pub mod prompts;

pub mod formatting_stage;
pub mod interest_stage;
pub mod market_stage;
pub mod personality_stage;
pub mod recommendation_stage;
pub mod skill_stage;

pub use formatting_stage::FormattingStage;
pub use interest_stage::InterestStage;
pub use market_stage::MarketStage;
pub use personality_stage::PersonalityStage;
pub use recommendation_stage::RecommendationStage;
pub use skill_stage::SkillStage;

use crate::llm::{CompletionRequest, LlmError, ReasoningService};
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError};
use async_trait::async_trait;
use parse::ParseError;
use prompts::{RenderError, Variables};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;

/// A named Context field a stage may read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageInput {
    Name,
    Age,
    EducationLevel,
    Interests,
    ResumeText,
    PersonalityResponses,
    InterestProfile,
    SkillProfile,
    PersonalityProfile,
    MarketTrends,
    CareerRecommendations,
}

impl StageInput {
    /// Stage that fills this field, `None` for original profile input
    pub fn producer(&self) -> Option<PipelineStage> {
        match self {
            StageInput::InterestProfile => Some(PipelineStage::InterestProfiling),
            StageInput::SkillProfile => Some(PipelineStage::SkillEvaluation),
            StageInput::PersonalityProfile => Some(PipelineStage::PersonalityMapping),
            StageInput::MarketTrends => Some(PipelineStage::MarketAnalysis),
            StageInput::CareerRecommendations => Some(PipelineStage::CareerRecommendation),
            _ => None,
        }
    }
}

/// Programming errors that escape a stage
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error("stage '{stage}' declares input {input:?} produced by a later stage")]
    ForwardRead {
        stage: PipelineStage,
        input: StageInput,
    },

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Why a stage used its fallback record. Never leaves the stage as an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageFailure {
    #[error("request rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("reasoning service failed: {0}")]
    Service(#[from] LlmError),

    #[error("response rejected: {0}")]
    Parse(#[from] ParseError),
}

/// How the stored record was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Record built from the service response
    Completed,
    /// Fallback record stored
    FellBack(StageFailure),
}

impl StageOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, StageOutcome::FellBack(_))
    }
}

/// Result of one stage run
#[derive(Debug)]
pub struct StageRun {
    pub context: Context,
    pub outcome: StageOutcome,
}

/// Object-safe stage interface driven by the Coordinator
#[async_trait]
pub trait Stage: Send + Sync {
    fn id(&self) -> PipelineStage;

    /// Context fields this stage reads, in prompt order
    fn required_inputs(&self) -> &'static [StageInput];

    /// Run the full lifecycle and write this stage's slot.
    ///
    /// Service and parsing failures are absorbed into the fallback record;
    /// only programming errors are returned.
    async fn run(&self, context: Context) -> Result<StageRun, StageError>;
}

/// Per-stage data plugged into the shared lifecycle
pub trait StageContract: Send + Sync {
    type Record: Serialize + JsonSchema + Send + 'static;

    const STAGE: PipelineStage;
    const TEMPLATE: &'static str;
    const INPUTS: &'static [StageInput];

    fn service(&self) -> &dyn ReasoningService;

    /// Template variables derived from the declared inputs
    fn variables(&self, context: &Context) -> Variables;

    /// Validate a service response and build the record
    fn parse(&self, value: serde_json::Value) -> Result<Self::Record, ParseError>;

    /// Deterministic, schema-valid substitute
    fn fallback(&self) -> Self::Record;

    /// Write the record into this stage's slot
    fn store(context: &mut Context, record: Self::Record) -> Result<(), ContextError>;
}

/// JSON schema of a record, sent along with the request
pub fn record_schema<R: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(R)).unwrap_or_default()
}

async fn attempt<T: StageContract>(
    stage: &T,
    context: &Context,
) -> Result<T::Record, StageFailure> {
    let variables = stage.variables(context);
    let prompt = prompts::render(T::TEMPLATE, &variables)?;

    let request = CompletionRequest {
        stage: T::STAGE,
        prompt,
        schema: record_schema::<T::Record>(),
    };
    let text = stage.service().complete(&request).await?;
    let value = parse::extract_json(&text)?;
    Ok(stage.parse(value)?)
}

#[async_trait]
impl<T: StageContract> Stage for T {
    fn id(&self) -> PipelineStage {
        T::STAGE
    }

    fn required_inputs(&self) -> &'static [StageInput] {
        T::INPUTS
    }

    async fn run(&self, mut context: Context) -> Result<StageRun, StageError> {
        for input in T::INPUTS {
            if let Some(producer) = input.producer() {
                if !producer.precedes(T::STAGE) {
                    return Err(StageError::ForwardRead {
                        stage: T::STAGE,
                        input: *input,
                    });
                }
            }
        }

        let (record, outcome) = match attempt(self, &context).await {
            Ok(record) => (record, StageOutcome::Completed),
            Err(failure) => {
                tracing::warn!(stage = %T::STAGE, error = %failure, "Stage fell back to default record");
                (self.fallback(), StageOutcome::FellBack(failure))
            }
        };

        T::store(&mut context, record)?;
        Ok(StageRun { context, outcome })
    }
}

/// Public description of a stage, served by the CLI and HTTP API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: Vec<StageInput>,
}

impl StageDescriptor {
    pub fn of(stage: &dyn Stage) -> Self {
        let id = stage.id();
        Self {
            id: id.id(),
            name: id.display_name(),
            description: id.description(),
            inputs: stage.required_inputs().to_vec(),
        }
    }
}

/// All six stages in execution order, sharing one service
pub fn default_stages(service: Arc<dyn ReasoningService>) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(InterestStage::new(service.clone())),
        Box::new(SkillStage::new(service.clone())),
        Box::new(PersonalityStage::new(service.clone())),
        Box::new(MarketStage::new(service.clone())),
        Box::new(RecommendationStage::new(service.clone())),
        Box::new(FormattingStage::new(service)),
    ]
}

/// Context whose slots before `stage` hold each stage's fallback record
#[cfg(test)]
pub(crate) fn context_before(stage: PipelineStage, input: crate::state::UserProfileInput) -> Context {
    let service: Arc<dyn ReasoningService> = Arc::new(crate::llm::FakeReasoningService::new());
    let mut context = Context::new(input);
    for earlier in PipelineStage::ORDER
        .into_iter()
        .take_while(|earlier| *earlier != stage)
    {
        let stored = match earlier {
            PipelineStage::InterestProfiling => {
                InterestStage::store(&mut context, InterestStage::new(service.clone()).fallback())
            }
            PipelineStage::SkillEvaluation => {
                SkillStage::store(&mut context, SkillStage::new(service.clone()).fallback())
            }
            PipelineStage::PersonalityMapping => PersonalityStage::store(
                &mut context,
                PersonalityStage::new(service.clone()).fallback(),
            ),
            PipelineStage::MarketAnalysis => {
                MarketStage::store(&mut context, MarketStage::new(service.clone()).fallback())
            }
            PipelineStage::CareerRecommendation => RecommendationStage::store(
                &mut context,
                RecommendationStage::new(service.clone()).fallback(),
            ),
            _ => Ok(()),
        };
        stored.expect("earlier slots are written in order");
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeReasoningService;

    #[test]
    fn test_default_stages_follow_pipeline_order() {
        let stages = default_stages(Arc::new(FakeReasoningService::new()));
        let ids: Vec<_> = stages.iter().map(|s| s.id()).collect();
        assert_eq!(ids, PipelineStage::ORDER.to_vec());
    }

    #[test]
    fn test_declared_inputs_only_read_earlier_stages() {
        for stage in default_stages(Arc::new(FakeReasoningService::new())) {
            for input in stage.required_inputs() {
                if let Some(producer) = input.producer() {
                    assert!(
                        producer.precedes(stage.id()),
                        "{} reads {:?}",
                        stage.id(),
                        input
                    );
                }
            }
        }
    }

    /// Interest-slot stage with a configurable input list and no variables
    struct Probe {
        service: Arc<FakeReasoningService>,
    }

    struct ForwardProbe(Probe);

    fn empty_profile() -> crate::state::InterestProfile {
        crate::state::InterestProfile {
            primary_interests: vec![],
            interest_scores: Default::default(),
            reasoning: String::new(),
        }
    }

    impl StageContract for Probe {
        type Record = crate::state::InterestProfile;
        const STAGE: PipelineStage = PipelineStage::InterestProfiling;
        const TEMPLATE: &'static str = "Hello {name}";
        const INPUTS: &'static [StageInput] = &[StageInput::Name];

        fn service(&self) -> &dyn ReasoningService {
            self.service.as_ref()
        }
        fn variables(&self, _context: &Context) -> Variables {
            Variables::new()
        }
        fn parse(&self, _value: serde_json::Value) -> Result<Self::Record, ParseError> {
            Ok(empty_profile())
        }
        fn fallback(&self) -> Self::Record {
            empty_profile()
        }
        fn store(context: &mut Context, record: Self::Record) -> Result<(), ContextError> {
            context.set_interest_profile(record)
        }
    }

    impl StageContract for ForwardProbe {
        type Record = crate::state::InterestProfile;
        const STAGE: PipelineStage = PipelineStage::InterestProfiling;
        const TEMPLATE: &'static str = "Hello";
        const INPUTS: &'static [StageInput] = &[StageInput::Name, StageInput::MarketTrends];

        fn service(&self) -> &dyn ReasoningService {
            self.0.service()
        }
        fn variables(&self, context: &Context) -> Variables {
            self.0.variables(context)
        }
        fn parse(&self, value: serde_json::Value) -> Result<Self::Record, ParseError> {
            self.0.parse(value)
        }
        fn fallback(&self) -> Self::Record {
            self.0.fallback()
        }
        fn store(context: &mut Context, record: Self::Record) -> Result<(), ContextError> {
            Probe::store(context, record)
        }
    }

    fn fresh_context() -> Context {
        Context::new(crate::state::UserProfileInput::new("Ada", "Other"))
    }

    #[test]
    fn test_unbound_variable_falls_back_without_calling_service() {
        let service = Arc::new(FakeReasoningService::new());
        let probe = Probe {
            service: service.clone(),
        };

        let run = tokio_test::block_on(probe.run(fresh_context())).unwrap();
        assert_eq!(
            run.outcome,
            StageOutcome::FellBack(StageFailure::Render(RenderError::MissingVariable(
                "name".into()
            )))
        );
        assert!(run.context.interest_profile().is_some());
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_forward_read_is_a_programming_error() {
        let service = Arc::new(FakeReasoningService::new());
        let probe = ForwardProbe(Probe {
            service: service.clone(),
        });

        let result = tokio_test::block_on(probe.run(fresh_context()));
        assert!(matches!(
            result,
            Err(StageError::ForwardRead {
                stage: PipelineStage::InterestProfiling,
                input: StageInput::MarketTrends,
            })
        ));
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_record_schema_is_object() {
        let schema = record_schema::<crate::state::InterestProfile>();
        assert!(schema["properties"]["primary_interests"].is_object());
    }
}
