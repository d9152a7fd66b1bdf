//! # Orchestrator
//!
//! Drives the six stages over a [`Context`](crate::state::Context).
//!
//! Flow: InterestProfiling -> SkillEvaluation -> PersonalityMapping ->
//! MarketAnalysis -> CareerRecommendation -> OutputFormatting -> Complete

pub mod coordinator;
pub mod events;
pub mod fallback;
pub mod pipeline;

pub use coordinator::Coordinator;
pub use events::{PipelineEvent, PipelineEventKind};
pub use fallback::fallback_context;
pub use pipeline::{Pipeline, PipelineStage};
