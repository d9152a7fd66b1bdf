//! # Pipeline Coordinator
//!
//! Runs the six stages in order over one [`Context`] and guarantees a fully
//! populated result: stage-level failures are absorbed by each stage, and
//! anything that escapes a stage (internal errors, panics, an incomplete
//! Context) is replaced by the whole-pipeline fallback.

use anyhow::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::CounselorConfig;
use crate::llm::{HttpReasoningService, ReasoningService};
use crate::stages::{
    default_stages, FormattingStage, InterestStage, MarketStage, PersonalityStage,
    RecommendationStage, SkillStage, Stage, StageDescriptor, StageOutcome,
};
use crate::state::{Context, UserProfileInput};

use super::events::{PipelineEvent, PipelineEventKind};
use super::fallback::fallback_context;
use super::pipeline::{Pipeline, PipelineStage};

/// The pipeline coordinator. Holds no per-run state and can be shared
/// across concurrent runs.
pub struct Coordinator {
    stages: Vec<Box<dyn Stage>>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Coordinator {
    /// Build HTTP-backed stages, each with its own resolved model config
    pub fn new(config: &CounselorConfig) -> Result<Self> {
        let service = |stage: PipelineStage| -> Result<Arc<dyn ReasoningService>> {
            let model = config.model_config_for(stage);
            tracing::debug!(stage = %stage, provider = model.provider.display_name(), model = %model.model, "Configured stage model");
            Ok(Arc::new(HttpReasoningService::new(model)?))
        };

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(InterestStage::new(service(PipelineStage::InterestProfiling)?)),
            Box::new(SkillStage::new(service(PipelineStage::SkillEvaluation)?)),
            Box::new(PersonalityStage::new(service(PipelineStage::PersonalityMapping)?)),
            Box::new(MarketStage::new(service(PipelineStage::MarketAnalysis)?)),
            Box::new(RecommendationStage::new(service(PipelineStage::CareerRecommendation)?)),
            Box::new(FormattingStage::new(service(PipelineStage::OutputFormatting)?)),
        ];
        Ok(Self::from_stages(stages))
    }

    /// All stages share `service`
    pub fn with_service(service: Arc<dyn ReasoningService>) -> Self {
        Self::from_stages(default_stages(service))
    }

    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn stage_descriptors(&self) -> Vec<StageDescriptor> {
        self.stages
            .iter()
            .map(|stage| StageDescriptor::of(stage.as_ref()))
            .collect()
    }

    /// Emit an event
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run every stage over a fresh Context.
    ///
    /// Never fails: the returned Context always has all six slots filled.
    #[tracing::instrument(skip_all, fields(stages = self.stages.len()))]
    pub async fn process_input(&self, user_input: UserProfileInput) -> Context {
        self.emit(PipelineEvent::new(
            PipelineEventKind::PipelineStarted,
            PipelineStage::InterestProfiling,
        ))
        .await;

        let mut pipeline = Pipeline::new();
        let outcome = AssertUnwindSafe(self.run_stages(&mut pipeline, user_input.clone()))
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(context)) => {
                tracing::info!("Pipeline complete");
                self.emit(PipelineEvent::new(
                    PipelineEventKind::PipelineCompleted,
                    PipelineStage::Complete,
                ))
                .await;
                return context;
            }
            Ok(Err(error)) => format!("{:#}", error),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                format!("stage panicked: {}", message)
            }
        };

        let stopped_at = pipeline.stage;
        pipeline.fail();
        tracing::error!(error = %reason, stage = %stopped_at, "Pipeline failed, returning fallback context");
        self.emit(
            PipelineEvent::new(PipelineEventKind::PipelineFailed, pipeline.stage)
                .with_data(serde_json::json!({
                    "error": reason,
                    "stopped_at": stopped_at.to_string(),
                })),
        )
        .await;
        fallback_context(user_input)
    }

    async fn run_stages(
        &self,
        pipeline: &mut Pipeline,
        user_input: UserProfileInput,
    ) -> Result<Context> {
        let mut context = Context::new(user_input);

        for stage in &self.stages {
            if stage.id() != pipeline.stage {
                anyhow::bail!(
                    "stage '{}' registered where '{}' was expected",
                    stage.id(),
                    pipeline.stage
                );
            }

            tracing::info!(stage = %pipeline.stage, "Stage started");
            self.emit(PipelineEvent::new(
                PipelineEventKind::StageStarted,
                pipeline.stage,
            ))
            .await;

            let run = stage.run(context).await?;
            context = run.context;

            let event = match run.outcome {
                StageOutcome::Completed => {
                    tracing::info!(stage = %pipeline.stage, "Stage completed");
                    PipelineEvent::new(PipelineEventKind::StageCompleted, pipeline.stage)
                }
                StageOutcome::FellBack(failure) => {
                    PipelineEvent::new(PipelineEventKind::StageFellBack, pipeline.stage)
                        .with_data(serde_json::json!({ "error": failure.to_string() }))
                }
            };
            self.emit(event).await;

            pipeline.advance();
        }

        if !pipeline.is_success() || !context.is_complete() {
            anyhow::bail!(
                "pipeline stopped at '{}' with slot {:?} still empty",
                pipeline.stage,
                context.next_stage()
            );
        }
        Ok(context)
    }
}
