//! Interest Profiler stage: maps stated interests onto the category taxonomy.

use super::context::{additional_context, format_list};
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError, InterestCategory, InterestProfile};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const PRIMARY_INTERESTS: usize = 3;
const AGE_NOT_SPECIFIED: &str = "Not specified";

/// Preset scores in taxonomy order
const FALLBACK_SCORES: [f64; 10] = [70.0, 30.0, 60.0, 40.0, 50.0, 45.0, 35.0, 25.0, 20.0, 15.0];

pub struct InterestStage {
    service: Arc<dyn ReasoningService>,
}

impl InterestStage {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }
}

impl StageContract for InterestStage {
    type Record = InterestProfile;

    const STAGE: PipelineStage = PipelineStage::InterestProfiling;
    const TEMPLATE: &'static str = prompts::INTEREST_PROFILER;
    const INPUTS: &'static [StageInput] = &[
        StageInput::Name,
        StageInput::Age,
        StageInput::EducationLevel,
        StageInput::Interests,
        StageInput::ResumeText,
        StageInput::PersonalityResponses,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let input = context.user_input();
        let categories: Vec<&str> = InterestCategory::all().iter().map(|c| c.as_str()).collect();

        let mut vars = Variables::new();
        vars.insert("name", input.name.clone());
        vars.insert(
            "age",
            input
                .age
                .map(|age| age.to_string())
                .unwrap_or_else(|| AGE_NOT_SPECIFIED.to_string()),
        );
        vars.insert("education_level", input.education_level.clone());
        vars.insert("interests", format_list(&input.interests));
        vars.insert("additional_context", additional_context(input));
        vars.insert("categories", categories.join(", "));
        vars
    }

    fn parse(&self, value: Value) -> Result<InterestProfile, ParseError> {
        let obj = parse::as_object(&value)?;

        let mut primary_interests: Vec<String> = Vec::new();
        for name in parse::string_list(obj, "primary_interests", true)? {
            match InterestCategory::parse(&name) {
                Some(category) => {
                    let canonical = category.as_str().to_string();
                    if !primary_interests.contains(&canonical) {
                        primary_interests.push(canonical);
                    }
                }
                None => tracing::debug!(interest = %name, "Dropping interest outside the taxonomy"),
            }
        }
        if primary_interests.is_empty() {
            return Err(ParseError::NothingValid("primary_interests"));
        }
        primary_interests.truncate(PRIMARY_INTERESTS);

        let interest_scores = parse::number_map(obj, "interest_scores", true)?
            .into_iter()
            .map(|(name, score)| {
                let name = InterestCategory::parse(&name)
                    .map(|c| c.as_str().to_string())
                    .unwrap_or(name);
                (name, score.clamp(0.0, 100.0))
            })
            .collect();

        Ok(InterestProfile {
            primary_interests,
            interest_scores,
            reasoning: parse::required_str(obj, "reasoning")?,
        })
    }

    fn fallback(&self) -> InterestProfile {
        let interest_scores: BTreeMap<String, f64> = InterestCategory::all()
            .iter()
            .zip(FALLBACK_SCORES)
            .map(|(category, score)| (category.as_str().to_string(), score))
            .collect();

        InterestProfile {
            primary_interests: vec![
                InterestCategory::Technology.as_str().to_string(),
                InterestCategory::Business.as_str().to_string(),
                InterestCategory::Education.as_str().to_string(),
            ],
            interest_scores,
            reasoning: "Unable to analyze interests fully. Provided general recommendations based on common career paths.".to_string(),
        }
    }

    fn store(context: &mut Context, record: InterestProfile) -> Result<(), ContextError> {
        context.set_interest_profile(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FakeReasoningService, LlmError};
    use crate::stages::Stage;
    use crate::state::UserProfileInput;
    use serde_json::json;

    fn stage_with(fake: FakeReasoningService) -> (InterestStage, Arc<FakeReasoningService>) {
        let fake = Arc::new(fake);
        (InterestStage::new(fake.clone()), fake)
    }

    fn input() -> UserProfileInput {
        UserProfileInput::new("Ada Lovelace", "Bachelor's Degree")
            .with_age(28)
            .with_interests(["mathematics", "machines"])
    }

    #[tokio::test]
    async fn test_parses_valid_response() {
        let (stage, fake) = stage_with(FakeReasoningService::new().with_json(
            PipelineStage::InterestProfiling,
            json!({
                "primary_interests": ["science & research", "Technology & Engineering", "Astrology", "Arts & Creative", "Education & Training"],
                "interest_scores": {"Science & Research": 120, "Technology & Engineering": "85", "Arts & Creative": "n/a"},
                "reasoning": "Strong analytical bent"
            }),
        ));

        let run = stage.run(Context::new(input())).await.unwrap();
        assert!(!run.outcome.is_fallback());

        let profile = run.context.interest_profile().unwrap();
        assert_eq!(
            profile.primary_interests,
            vec!["Science & Research", "Technology & Engineering", "Arts & Creative"]
        );
        assert_eq!(profile.interest_scores["Science & Research"], 100.0);
        assert_eq!(profile.interest_scores["Technology & Engineering"], 85.0);
        assert!(!profile.interest_scores.contains_key("Arts & Creative"));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_profile_and_taxonomy() {
        let (stage, fake) = stage_with(FakeReasoningService::new());
        stage.run(Context::new(input())).await.unwrap();

        let prompt = &fake.calls()[0].prompt;
        assert!(prompt.contains("Ada Lovelace"));
        assert!(prompt.contains("Age: 28"));
        assert!(prompt.contains("mathematics, machines"));
        assert!(prompt.contains("No additional context"));
        assert!(prompt.contains("Agriculture & Environment"));
    }

    #[tokio::test]
    async fn test_empty_interests_use_sentinels() {
        let (stage, fake) = stage_with(FakeReasoningService::new());
        let run = stage
            .run(Context::new(UserProfileInput::new("Bo", "Other")))
            .await
            .unwrap();

        let prompt = &fake.calls()[0].prompt;
        assert!(prompt.contains("Stated interests: None provided"));
        assert!(prompt.contains("Age: Not specified"));
        assert!(!run.context.interest_profile().unwrap().primary_interests.is_empty());
    }

    #[tokio::test]
    async fn test_no_taxonomy_match_falls_back() {
        let (stage, _) = stage_with(FakeReasoningService::new().with_json(
            PipelineStage::InterestProfiling,
            json!({
                "primary_interests": ["Astrology"],
                "interest_scores": {},
                "reasoning": "?"
            }),
        ));

        let run = stage.run(Context::new(input())).await.unwrap();
        assert!(run.outcome.is_fallback());
        assert_eq!(run.context.interest_profile(), Some(&stage.fallback()));
    }

    #[tokio::test]
    async fn test_service_failure_falls_back() {
        let (stage, _) = stage_with(
            FakeReasoningService::new()
                .with_failure(PipelineStage::InterestProfiling, LlmError::RateLimited),
        );

        let run = stage.run(Context::new(input())).await.unwrap();
        assert!(matches!(
            run.outcome,
            crate::stages::StageOutcome::FellBack(crate::stages::StageFailure::Service(
                LlmError::RateLimited
            ))
        ));
    }

    #[test]
    fn test_fallback_scores_follow_taxonomy() {
        let stage = InterestStage::new(Arc::new(FakeReasoningService::new()));
        let fallback = stage.fallback();
        assert_eq!(fallback.interest_scores.len(), 10);
        assert_eq!(fallback.interest_scores["Technology & Engineering"], 70.0);
        assert_eq!(fallback.interest_scores["Agriculture & Environment"], 15.0);
        assert_eq!(fallback.primary_interests[2], "Education & Training");
    }
}
