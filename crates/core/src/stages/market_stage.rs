//! Market Trend Analyzer stage.

use super::context::format_list;
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError, MarketTrends};
use chrono::Datelike;
use serde_json::Value;
use std::sync::Arc;

/// (career, salary range, outlook)
const FALLBACK_CAREERS: [(&str, &str, &str); 5] = [
    (
        "Data Analyst",
        "$50,000 - $80,000 annually",
        "Very positive, high demand across industries",
    ),
    (
        "Software Developer",
        "$60,000 - $120,000 annually",
        "Excellent, continued growth expected",
    ),
    (
        "Digital Marketing Specialist",
        "$40,000 - $70,000 annually",
        "Positive, growing digital presence needs",
    ),
    (
        "Project Manager",
        "$55,000 - $95,000 annually",
        "Good, needed across all sectors",
    ),
    (
        "UX/UI Designer",
        "$50,000 - $90,000 annually",
        "Positive, increasing focus on user experience",
    ),
];

const FALLBACK_SECTORS: [&str; 5] = [
    "Technology",
    "Healthcare",
    "Renewable Energy",
    "E-commerce",
    "Remote Services",
];

pub struct MarketStage {
    service: Arc<dyn ReasoningService>,
    /// Year the market analysis is framed for. Fixed for the stage's
    /// lifetime so identical Contexts produce identical requests.
    year: i32,
}

impl MarketStage {
    /// Frame the analysis for the current calendar year
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self::for_year(service, chrono::Utc::now().year())
    }

    pub fn for_year(service: Arc<dyn ReasoningService>, year: i32) -> Self {
        Self { service, year }
    }
}

impl StageContract for MarketStage {
    type Record = MarketTrends;

    const STAGE: PipelineStage = PipelineStage::MarketAnalysis;
    const TEMPLATE: &'static str = prompts::MARKET_TREND_ANALYZER;
    const INPUTS: &'static [StageInput] = &[
        StageInput::InterestProfile,
        StageInput::SkillProfile,
        StageInput::EducationLevel,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let primary_interests = context
            .interest_profile()
            .map(|profile| profile.primary_interests.clone())
            .unwrap_or_default();
        let skills = context
            .skill_profile()
            .map(|profile| profile.all_skills())
            .unwrap_or_default();

        let mut vars = Variables::new();
        vars.insert("primary_interests", format_list(&primary_interests));
        vars.insert("skills", format_list(&skills));
        vars.insert(
            "education_level",
            context.user_input().education_level.clone(),
        );
        vars.insert("year", self.year.to_string());
        vars
    }

    fn parse(&self, value: Value) -> Result<MarketTrends, ParseError> {
        let obj = parse::as_object(&value)?;

        Ok(MarketTrends {
            trending_careers: parse::string_list(obj, "trending_careers", true)?,
            growth_sectors: parse::string_list(obj, "growth_sectors", true)?,
            salary_insights: parse::string_map(obj, "salary_insights", false)?,
            job_outlook: parse::string_map(obj, "job_outlook", false)?,
            reasoning: parse::required_str(obj, "reasoning")?,
        })
    }

    fn fallback(&self) -> MarketTrends {
        MarketTrends {
            trending_careers: FALLBACK_CAREERS
                .iter()
                .map(|(career, _, _)| career.to_string())
                .collect(),
            growth_sectors: FALLBACK_SECTORS.iter().map(|s| s.to_string()).collect(),
            salary_insights: FALLBACK_CAREERS
                .iter()
                .map(|(career, salary, _)| (career.to_string(), salary.to_string()))
                .collect(),
            job_outlook: FALLBACK_CAREERS
                .iter()
                .map(|(career, _, outlook)| (career.to_string(), outlook.to_string()))
                .collect(),
            reasoning: "Unable to analyze specific market trends. Provided general high-demand career paths with positive outlooks.".to_string(),
        }
    }

    fn store(context: &mut Context, record: MarketTrends) -> Result<(), ContextError> {
        context.set_market_trends(record)
    }
}
