//! # Run Context
//!
//! The per-run accumulator: the original profile input plus one write-once
//! slot per stage. Slots fill strictly in pipeline order.

use super::input::UserProfileInput;
use super::records::{
    CareerRecommendations, FormattedOutput, InterestProfile, MarketTrends, PersonalityProfile,
    SkillProfile,
};
use crate::orchestrator::PipelineStage;
use serde::Serialize;

/// Rejected slot writes. These only arise from programming errors, never from
/// bad service output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("slot for stage '{0}' is already set")]
    SlotAlreadySet(PipelineStage),

    #[error("stage '{attempted}' wrote out of order (next writable slot: {expected:?})")]
    OutOfOrder {
        expected: Option<PipelineStage>,
        attempted: PipelineStage,
    },
}

/// Accumulated pipeline state for one run.
///
/// Serialize-only: a Context can only be built through [`Context::new`] and
/// the in-order slot setters.
///
/// ```compile_fail
/// let ctx: compass_core::state::Context = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    user_input: UserProfileInput,
    interest_profile: Option<InterestProfile>,
    skill_profile: Option<SkillProfile>,
    personality_profile: Option<PersonalityProfile>,
    market_trends: Option<MarketTrends>,
    career_recommendations: Option<CareerRecommendations>,
    formatted_output: Option<FormattedOutput>,
}

impl Context {
    /// Fresh context with every stage slot empty
    pub fn new(user_input: UserProfileInput) -> Self {
        Self {
            user_input,
            interest_profile: None,
            skill_profile: None,
            personality_profile: None,
            market_trends: None,
            career_recommendations: None,
            formatted_output: None,
        }
    }

    /// Fully populated context, used for the whole-pipeline fallback
    #[allow(clippy::too_many_arguments)]
    pub fn complete(
        user_input: UserProfileInput,
        interest_profile: InterestProfile,
        skill_profile: SkillProfile,
        personality_profile: PersonalityProfile,
        market_trends: MarketTrends,
        career_recommendations: CareerRecommendations,
        formatted_output: FormattedOutput,
    ) -> Self {
        Self {
            user_input,
            interest_profile: Some(interest_profile),
            skill_profile: Some(skill_profile),
            personality_profile: Some(personality_profile),
            market_trends: Some(market_trends),
            career_recommendations: Some(career_recommendations),
            formatted_output: Some(formatted_output),
        }
    }

    pub fn user_input(&self) -> &UserProfileInput {
        &self.user_input
    }

    pub fn interest_profile(&self) -> Option<&InterestProfile> {
        self.interest_profile.as_ref()
    }

    pub fn skill_profile(&self) -> Option<&SkillProfile> {
        self.skill_profile.as_ref()
    }

    pub fn personality_profile(&self) -> Option<&PersonalityProfile> {
        self.personality_profile.as_ref()
    }

    pub fn market_trends(&self) -> Option<&MarketTrends> {
        self.market_trends.as_ref()
    }

    pub fn career_recommendations(&self) -> Option<&CareerRecommendations> {
        self.career_recommendations.as_ref()
    }

    pub fn formatted_output(&self) -> Option<&FormattedOutput> {
        self.formatted_output.as_ref()
    }

    /// Whether the slot owned by `stage` holds a record
    pub fn is_filled(&self, stage: PipelineStage) -> bool {
        match stage {
            PipelineStage::InterestProfiling => self.interest_profile.is_some(),
            PipelineStage::SkillEvaluation => self.skill_profile.is_some(),
            PipelineStage::PersonalityMapping => self.personality_profile.is_some(),
            PipelineStage::MarketAnalysis => self.market_trends.is_some(),
            PipelineStage::CareerRecommendation => self.career_recommendations.is_some(),
            PipelineStage::OutputFormatting => self.formatted_output.is_some(),
            PipelineStage::Complete | PipelineStage::Failed => false,
        }
    }

    /// Next slot that may be written, or `None` once all six are filled
    pub fn next_stage(&self) -> Option<PipelineStage> {
        PipelineStage::ORDER
            .into_iter()
            .find(|stage| !self.is_filled(*stage))
    }

    /// All six slots populated
    pub fn is_complete(&self) -> bool {
        self.next_stage().is_none()
    }

    fn check_writable(&self, stage: PipelineStage) -> Result<(), ContextError> {
        if self.is_filled(stage) {
            return Err(ContextError::SlotAlreadySet(stage));
        }
        let expected = self.next_stage();
        if expected != Some(stage) {
            return Err(ContextError::OutOfOrder {
                expected,
                attempted: stage,
            });
        }
        Ok(())
    }

    pub fn set_interest_profile(&mut self, record: InterestProfile) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::InterestProfiling)?;
        self.interest_profile = Some(record);
        Ok(())
    }

    pub fn set_skill_profile(&mut self, record: SkillProfile) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::SkillEvaluation)?;
        self.skill_profile = Some(record);
        Ok(())
    }

    pub fn set_personality_profile(
        &mut self,
        record: PersonalityProfile,
    ) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::PersonalityMapping)?;
        self.personality_profile = Some(record);
        Ok(())
    }

    pub fn set_market_trends(&mut self, record: MarketTrends) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::MarketAnalysis)?;
        self.market_trends = Some(record);
        Ok(())
    }

    pub fn set_career_recommendations(
        &mut self,
        record: CareerRecommendations,
    ) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::CareerRecommendation)?;
        self.career_recommendations = Some(record);
        Ok(())
    }

    pub fn set_formatted_output(&mut self, record: FormattedOutput) -> Result<(), ContextError> {
        self.check_writable(PipelineStage::OutputFormatting)?;
        self.formatted_output = Some(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn interest() -> InterestProfile {
        InterestProfile {
            primary_interests: vec!["Arts & Creative".into()],
            interest_scores: BTreeMap::new(),
            reasoning: "test".into(),
        }
    }

    fn skills() -> SkillProfile {
        SkillProfile {
            technical_skills: vec![],
            soft_skills: vec![],
            skill_levels: BTreeMap::new(),
            experience_years: None,
            reasoning: "test".into(),
        }
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = Context::new(UserProfileInput::new("Ada", "Other"));
        assert_eq!(ctx.next_stage(), Some(PipelineStage::InterestProfiling));
        assert!(!ctx.is_complete());
    }

    #[test]
    fn test_slots_fill_in_order() {
        let mut ctx = Context::new(UserProfileInput::new("Ada", "Other"));
        ctx.set_interest_profile(interest()).unwrap();
        ctx.set_skill_profile(skills()).unwrap();
        assert_eq!(ctx.next_stage(), Some(PipelineStage::PersonalityMapping));
    }

    #[test]
    fn test_out_of_order_write_rejected() {
        let mut ctx = Context::new(UserProfileInput::new("Ada", "Other"));
        let err = ctx.set_skill_profile(skills()).unwrap_err();
        assert_eq!(
            err,
            ContextError::OutOfOrder {
                expected: Some(PipelineStage::InterestProfiling),
                attempted: PipelineStage::SkillEvaluation,
            }
        );
        assert!(ctx.skill_profile().is_none());
    }

    #[test]
    fn test_serializes_empty_slots_as_null() {
        let mut ctx = Context::new(UserProfileInput::new("Ada", "Other"));
        ctx.set_interest_profile(interest()).unwrap();

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["user_input"]["name"], "Ada");
        assert_eq!(json["interest_profile"]["reasoning"], "test");
        assert!(json["skill_profile"].is_null());
        assert!(json["formatted_output"].is_null());
    }

    #[test]
    fn test_slot_never_overwritten() {
        let mut ctx = Context::new(UserProfileInput::new("Ada", "Other"));
        ctx.set_interest_profile(interest()).unwrap();

        let mut other = interest();
        other.reasoning = "second".into();
        let err = ctx.set_interest_profile(other).unwrap_err();

        assert_eq!(
            err,
            ContextError::SlotAlreadySet(PipelineStage::InterestProfiling)
        );
        assert_eq!(ctx.interest_profile().unwrap().reasoning, "test");
    }
}
