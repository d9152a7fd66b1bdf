//! Skill Evaluator stage: extracts technical and soft skills from the
//! resume and grades them.

use super::context::{basic_context, NO_RESUME};
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError, ProficiencyLevel, SkillProfile};
use serde_json::Value;
use std::sync::Arc;

pub struct SkillStage {
    service: Arc<dyn ReasoningService>,
}

impl SkillStage {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }
}

impl StageContract for SkillStage {
    type Record = SkillProfile;

    const STAGE: PipelineStage = PipelineStage::SkillEvaluation;
    const TEMPLATE: &'static str = prompts::SKILL_EVALUATOR;
    const INPUTS: &'static [StageInput] = &[
        StageInput::Name,
        StageInput::EducationLevel,
        StageInput::ResumeText,
        StageInput::Interests,
        StageInput::InterestProfile,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let input = context.user_input();

        let mut vars = Variables::new();
        vars.insert("name", input.name.clone());
        vars.insert("education_level", input.education_level.clone());
        vars.insert(
            "resume_text",
            input.resume().unwrap_or(NO_RESUME).to_string(),
        );
        vars.insert("additional_context", basic_context(context, Self::STAGE));
        vars
    }

    fn parse(&self, value: Value) -> Result<SkillProfile, ParseError> {
        let obj = parse::as_object(&value)?;

        let skill_levels = parse::string_map(obj, "skill_levels", false)?
            .into_iter()
            .filter_map(|(skill, level)| match ProficiencyLevel::parse(&level) {
                Some(level) => Some((skill, level)),
                None => {
                    tracing::debug!(%skill, %level, "Dropping unknown proficiency level");
                    None
                }
            })
            .collect();

        let experience_years = obj
            .get("experience_years")
            .and_then(parse::number)
            .filter(|years| *years >= 0.0);

        Ok(SkillProfile {
            technical_skills: parse::string_list(obj, "technical_skills", false)?,
            soft_skills: parse::string_list(obj, "soft_skills", false)?,
            skill_levels,
            experience_years,
            reasoning: parse::required_str(obj, "reasoning")?,
        })
    }

    fn fallback(&self) -> SkillProfile {
        let technical: Vec<String> = ["Communication", "Problem Solving", "Teamwork"]
            .into_iter()
            .map(String::from)
            .collect();
        let skill_levels = technical
            .iter()
            .map(|skill| (skill.clone(), ProficiencyLevel::Intermediate))
            .collect();

        SkillProfile {
            technical_skills: technical,
            soft_skills: vec![
                "Leadership".to_string(),
                "Time Management".to_string(),
                "Adaptability".to_string(),
            ],
            skill_levels,
            experience_years: Some(0.0),
            reasoning: "Unable to analyze skills from provided information. Provided general foundational skills.".to_string(),
        }
    }

    fn store(context: &mut Context, record: SkillProfile) -> Result<(), ContextError> {
        context.set_skill_profile(record)
    }
}
