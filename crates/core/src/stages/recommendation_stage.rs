//! Career Recommender stage: synthesizes interests, skills, personality and
//! market data into ranked recommendations.
//!
//! Each recommendation entry is validated on its own; a malformed entry is
//! dropped without discarding its siblings.

use super::context::format_record;
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{CareerRecommendation, CareerRecommendations, Context, ContextError};
use serde_json::Value;
use std::sync::Arc;

const MAX_RECOMMENDATIONS: usize = 5;

pub struct RecommendationStage {
    service: Arc<dyn ReasoningService>,
}

impl RecommendationStage {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    /// Preset entries used when no returned entry survives validation
    pub fn fallback_recommendations() -> Vec<CareerRecommendation> {
        vec![
            CareerRecommendation {
                title: "Business Analyst".to_string(),
                match_score: 75.0,
                required_skills: strings(&["Data Analysis", "Communication", "Problem Solving"]),
                education_requirements: "Bachelor's degree preferred".to_string(),
                salary_range: "$50,000 - $80,000 annually".to_string(),
                job_outlook: "Positive growth expected".to_string(),
                why_recommended: "Good match for analytical thinking and business interests"
                    .to_string(),
            },
            CareerRecommendation {
                title: "Project Coordinator".to_string(),
                match_score: 70.0,
                required_skills: strings(&["Organization", "Communication", "Time Management"]),
                education_requirements: "Bachelor's degree or equivalent experience".to_string(),
                salary_range: "$45,000 - $70,000 annually".to_string(),
                job_outlook: "Steady demand across industries".to_string(),
                why_recommended: "Suitable for organized individuals who enjoy coordinating tasks"
                    .to_string(),
            },
            CareerRecommendation {
                title: "Customer Success Specialist".to_string(),
                match_score: 68.0,
                required_skills: strings(&["Communication", "Empathy", "Problem Solving"]),
                education_requirements: "Bachelor's degree preferred".to_string(),
                salary_range: "$40,000 - $65,000 annually".to_string(),
                job_outlook: "Growing field with high demand".to_string(),
                why_recommended: "Perfect for people-oriented individuals who enjoy helping others"
                    .to_string(),
            },
        ]
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One entry, or `None` when any part of it is malformed
fn parse_entry(entry: &Value) -> Option<CareerRecommendation> {
    let obj = entry.as_object()?;

    let title = parse::required_str(obj, "title").ok()?;
    if title.trim().is_empty() {
        return None;
    }
    let match_score = obj.get("match_score").and_then(parse::number)?;

    Some(CareerRecommendation {
        title: title.trim().to_string(),
        match_score: match_score.clamp(0.0, 100.0),
        required_skills: parse::string_list(obj, "required_skills", false).ok()?,
        education_requirements: parse::optional_str(obj, "education_requirements").ok()?,
        salary_range: parse::optional_str(obj, "salary_range").ok()?,
        job_outlook: parse::optional_str(obj, "job_outlook").ok()?,
        why_recommended: parse::optional_str(obj, "why_recommended").ok()?,
    })
}

impl StageContract for RecommendationStage {
    type Record = CareerRecommendations;

    const STAGE: PipelineStage = PipelineStage::CareerRecommendation;
    const TEMPLATE: &'static str = prompts::CAREER_RECOMMENDER;
    const INPUTS: &'static [StageInput] = &[
        StageInput::InterestProfile,
        StageInput::SkillProfile,
        StageInput::PersonalityProfile,
        StageInput::MarketTrends,
        StageInput::Name,
        StageInput::EducationLevel,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let input = context.user_input();

        let mut vars = Variables::new();
        vars.insert("interest_profile", format_record(context.interest_profile()));
        vars.insert("skill_profile", format_record(context.skill_profile()));
        vars.insert(
            "personality_profile",
            format_record(context.personality_profile()),
        );
        vars.insert("market_trends", format_record(context.market_trends()));
        vars.insert("name", input.name.clone());
        vars.insert("education_level", input.education_level.clone());
        vars
    }

    fn parse(&self, value: Value) -> Result<CareerRecommendations, ParseError> {
        let obj = parse::as_object(&value)?;

        let entries = match obj.get("top_recommendations") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries.clone(),
            Some(_) => {
                return Err(ParseError::WrongType {
                    field: "top_recommendations",
                    expected: "a list",
                })
            }
        };

        let mut top_recommendations = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(entry) {
                Some(recommendation) => top_recommendations.push(recommendation),
                None => tracing::debug!(index, "Dropping malformed recommendation entry"),
            }
        }
        top_recommendations.truncate(MAX_RECOMMENDATIONS);
        if top_recommendations.is_empty() {
            tracing::warn!("No usable recommendation entries, substituting preset entries");
            top_recommendations = Self::fallback_recommendations();
        }

        Ok(CareerRecommendations {
            top_recommendations,
            alternative_paths: parse::string_list(obj, "alternative_paths", false)?,
            next_steps: parse::string_list(obj, "next_steps", false)?,
            reasoning: parse::optional_str(obj, "reasoning")?,
        })
    }

    fn fallback(&self) -> CareerRecommendations {
        CareerRecommendations {
            top_recommendations: Self::fallback_recommendations(),
            alternative_paths: strings(&[
                "Sales Representative",
                "Administrative Assistant",
                "Marketing Coordinator",
            ]),
            next_steps: strings(&[
                "Research the recommended career paths in detail",
                "Consider taking relevant online courses or certifications",
                "Network with professionals in these fields",
                "Update resume to highlight relevant skills",
                "Apply for entry-level positions or internships",
            ]),
            reasoning: "Unable to provide detailed analysis. Recommended versatile career paths suitable for various backgrounds.".to_string(),
        }
    }

    fn store(context: &mut Context, record: CareerRecommendations) -> Result<(), ContextError> {
        context.set_career_recommendations(record)
    }
}
