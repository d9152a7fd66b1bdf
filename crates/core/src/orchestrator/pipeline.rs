//! # Pipeline Stages
//!
//! Defines the stages of the counseling pipeline and the linear state
//! machine that walks them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Mapping interests onto the career taxonomy
    InterestProfiling,
    /// Extracting and grading skills
    SkillEvaluation,
    /// Mapping Big Five traits to work style
    PersonalityMapping,
    /// Matching the profile against market trends
    MarketAnalysis,
    /// Synthesizing career recommendations
    CareerRecommendation,
    /// Writing the final report
    OutputFormatting,
    /// Complete
    Complete,
    /// Whole-pipeline fallback was used
    Failed,
}

impl PipelineStage {
    /// The six working stages in execution order
    pub const ORDER: [PipelineStage; 6] = [
        PipelineStage::InterestProfiling,
        PipelineStage::SkillEvaluation,
        PipelineStage::PersonalityMapping,
        PipelineStage::MarketAnalysis,
        PipelineStage::CareerRecommendation,
        PipelineStage::OutputFormatting,
    ];

    /// Position in [`Self::ORDER`], `None` for terminal states
    pub fn index(&self) -> Option<usize> {
        Self::ORDER.iter().position(|stage| stage == self)
    }

    /// Stable identifier used in logs, events and config overrides
    pub fn id(&self) -> &'static str {
        match self {
            PipelineStage::InterestProfiling => "interest_profiler",
            PipelineStage::SkillEvaluation => "skill_evaluator",
            PipelineStage::PersonalityMapping => "personality_mapper",
            PipelineStage::MarketAnalysis => "market_trend_analyzer",
            PipelineStage::CareerRecommendation => "career_recommender",
            PipelineStage::OutputFormatting => "output_formatter",
            PipelineStage::Complete => "complete",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::InterestProfiling => "Interest Profiler",
            PipelineStage::SkillEvaluation => "Skill Evaluator",
            PipelineStage::PersonalityMapping => "Personality Mapper",
            PipelineStage::MarketAnalysis => "Market Trend Analyzer",
            PipelineStage::CareerRecommendation => "Career Recommender",
            PipelineStage::OutputFormatting => "Output Formatter",
            PipelineStage::Complete => "Complete",
            PipelineStage::Failed => "Failed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::InterestProfiling => "Analyzes user preferences and interests",
            PipelineStage::SkillEvaluation => "Extracts and evaluates skills from resume/input",
            PipelineStage::PersonalityMapping => "Maps personality traits to work preferences",
            PipelineStage::MarketAnalysis => "Analyzes current job market trends",
            PipelineStage::CareerRecommendation => "Synthesizes recommendations from all stages",
            PipelineStage::OutputFormatting => "Formats final recommendations",
            PipelineStage::Complete => "All stages finished",
            PipelineStage::Failed => "Whole-pipeline fallback returned",
        }
    }

    /// Whether `self` runs strictly before `other`
    pub fn precedes(&self, other: PipelineStage) -> bool {
        match (self.index(), other.index()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The pipeline state machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: PipelineStage,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: PipelineStage::InterestProfiling,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::InterestProfiling => PipelineStage::SkillEvaluation,
            PipelineStage::SkillEvaluation => PipelineStage::PersonalityMapping,
            PipelineStage::PersonalityMapping => PipelineStage::MarketAnalysis,
            PipelineStage::MarketAnalysis => PipelineStage::CareerRecommendation,
            PipelineStage::CareerRecommendation => PipelineStage::OutputFormatting,
            PipelineStage::OutputFormatting => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        };
    }

    /// Fail the pipeline
    pub fn fail(&mut self) {
        self.stage = PipelineStage::Failed;
    }

    /// Check if pipeline succeeded
    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_advance() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.stage, PipelineStage::InterestProfiling);

        pipeline.advance();
        assert_eq!(pipeline.stage, PipelineStage::SkillEvaluation);

        pipeline.advance();
        assert_eq!(pipeline.stage, PipelineStage::PersonalityMapping);
    }

    #[test]
    fn test_advance_walks_order_then_stops() {
        let mut pipeline = Pipeline::new();
        for expected in PipelineStage::ORDER {
            assert_eq!(pipeline.stage, expected);
            pipeline.advance();
        }
        assert!(pipeline.is_success());

        pipeline.advance();
        assert_eq!(pipeline.stage, PipelineStage::Complete);
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut pipeline = Pipeline::new();
        pipeline.fail();
        pipeline.advance();
        assert_eq!(pipeline.stage, PipelineStage::Failed);
        assert!(!pipeline.is_success());
    }

    #[test]
    fn test_precedes() {
        assert!(PipelineStage::InterestProfiling.precedes(PipelineStage::MarketAnalysis));
        assert!(!PipelineStage::MarketAnalysis.precedes(PipelineStage::MarketAnalysis));
        assert!(!PipelineStage::Complete.precedes(PipelineStage::OutputFormatting));
    }
}
