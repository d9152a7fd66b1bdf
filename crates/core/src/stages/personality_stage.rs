//! Personality Mapper stage: Big Five responses to work style preferences.

use super::context::{basic_context, format_map};
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError, PersonalityProfile, PersonalityTrait};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const TRAIT_MIN: f64 = 1.0;
const TRAIT_MAX: f64 = 5.0;

pub struct PersonalityStage {
    service: Arc<dyn ReasoningService>,
}

impl PersonalityStage {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }
}

/// Template variable holding a trait's stated score
fn trait_variable(personality_trait: PersonalityTrait) -> &'static str {
    match personality_trait {
        PersonalityTrait::Openness => "openness",
        PersonalityTrait::Conscientiousness => "conscientiousness",
        PersonalityTrait::Extraversion => "extraversion",
        PersonalityTrait::Agreeableness => "agreeableness",
        PersonalityTrait::Neuroticism => "neuroticism",
    }
}

impl StageContract for PersonalityStage {
    type Record = PersonalityProfile;

    const STAGE: PipelineStage = PipelineStage::PersonalityMapping;
    const TEMPLATE: &'static str = prompts::PERSONALITY_MAPPER;
    const INPUTS: &'static [StageInput] = &[
        StageInput::Name,
        StageInput::PersonalityResponses,
        StageInput::EducationLevel,
        StageInput::Interests,
        StageInput::InterestProfile,
        StageInput::SkillProfile,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let input = context.user_input();

        let mut vars = Variables::new();
        vars.insert("name", input.name.clone());
        vars.insert(
            "personality_responses",
            format_map(&input.personality_responses),
        );
        vars.insert("additional_context", basic_context(context, Self::STAGE));
        for personality_trait in PersonalityTrait::all() {
            vars.insert(
                trait_variable(personality_trait),
                input.trait_response(personality_trait).to_string(),
            );
        }
        vars
    }

    fn parse(&self, value: Value) -> Result<PersonalityProfile, ParseError> {
        let obj = parse::as_object(&value)?;

        let mut trait_scores = BTreeMap::new();
        match obj.get("trait_scores") {
            None | Some(Value::Null) => {}
            Some(Value::Object(scores)) => {
                for (name, score) in scores {
                    let Some(personality_trait) = PersonalityTrait::parse(name) else {
                        tracing::debug!(trait_name = %name, "Dropping unknown personality trait");
                        continue;
                    };
                    if let Some(score) = parse::number(score) {
                        trait_scores.insert(personality_trait, score.clamp(TRAIT_MIN, TRAIT_MAX));
                    }
                }
            }
            Some(_) => {
                return Err(ParseError::WrongType {
                    field: "trait_scores",
                    expected: "an object",
                })
            }
        }
        if trait_scores.is_empty() {
            trait_scores = PersonalityTrait::default_scores();
        }

        Ok(PersonalityProfile {
            trait_scores,
            work_style_preferences: parse::string_list(obj, "work_style_preferences", false)?,
            team_dynamics: parse::optional_str(obj, "team_dynamics")?,
            reasoning: parse::optional_str(obj, "reasoning")?,
        })
    }

    fn fallback(&self) -> PersonalityProfile {
        PersonalityProfile {
            trait_scores: PersonalityTrait::default_scores(),
            work_style_preferences: vec![
                "Collaborative environment".to_string(),
                "Structured tasks".to_string(),
                "Learning opportunities".to_string(),
            ],
            team_dynamics: "Works well in balanced team environments with clear communication."
                .to_string(),
            reasoning:
                "Unable to analyze personality responses. Provided balanced work preferences."
                    .to_string(),
        }
    }

    fn store(context: &mut Context, record: PersonalityProfile) -> Result<(), ContextError> {
        context.set_personality_profile(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeReasoningService;
    use crate::stages::{context_before, Stage};
    use crate::state::UserProfileInput;
    use serde_json::json;

    async fn run_with(response: Value, input: UserProfileInput) -> (PersonalityProfile, String) {
        let fake = Arc::new(
            FakeReasoningService::new().with_json(PipelineStage::PersonalityMapping, response),
        );
        let stage = PersonalityStage::new(fake.clone());
        let run = stage
            .run(context_before(PipelineStage::PersonalityMapping, input))
            .await
            .unwrap();
        let prompt = fake.calls()[0].prompt.clone();
        (run.context.personality_profile().unwrap().clone(), prompt)
    }

    #[tokio::test]
    async fn test_parses_and_clamps_scores() {
        let input = UserProfileInput::new("Ada", "Other").with_response("Openness to Experience", 5.0);
        let (profile, prompt) = run_with(
            json!({
                "trait_scores": {"Openness to Experience": 7, "extraversion": "2", "Agreeableness": "kind"},
                "work_style_preferences": ["Autonomy"],
                "team_dynamics": "Quiet contributor",
                "reasoning": "r"
            }),
            input,
        )
        .await;

        assert_eq!(profile.trait_scores.len(), 2);
        assert_eq!(profile.trait_scores[&PersonalityTrait::Openness], 5.0);
        assert_eq!(profile.trait_scores[&PersonalityTrait::Extraversion], 2.0);
        assert_eq!(profile.work_style_preferences, vec!["Autonomy"]);
        assert!(prompt.contains("Openness to Experience: 5"));
        assert!(prompt.contains("Neuroticism: 3"));
    }

    #[tokio::test]
    async fn test_unknown_traits_yield_default_map() {
        let (profile, _) = run_with(
            json!({"trait_scores": {"Curiosity": 4.0}, "reasoning": "r"}),
            UserProfileInput::new("Ada", "Other"),
        )
        .await;

        assert_eq!(profile.trait_scores, PersonalityTrait::default_scores());
        assert!(profile.trait_scores.values().all(|score| *score == 3.0));
        assert!(profile.work_style_preferences.is_empty());
        assert_eq!(profile.team_dynamics, "");
    }

    #[tokio::test]
    async fn test_no_responses_render_sentinel() {
        let (_, prompt) = run_with(json!({}), UserProfileInput::new("Ada", "Other")).await;
        assert!(prompt.contains("Raw responses: None provided"));
    }

    #[tokio::test]
    async fn test_wrong_shape_falls_back() {
        let fake = Arc::new(FakeReasoningService::new().with_json(
            PipelineStage::PersonalityMapping,
            json!({"trait_scores": ["Openness"]}),
        ));
        let stage = PersonalityStage::new(fake);
        let run = stage
            .run(context_before(
                PipelineStage::PersonalityMapping,
                UserProfileInput::new("Ada", "Other"),
            ))
            .await
            .unwrap();

        assert!(run.outcome.is_fallback());
        assert_eq!(
            run.context.personality_profile().unwrap().work_style_preferences.len(),
            3
        );
    }
}
