//! Whole-pipeline fallback returned when a run cannot finish normally.

use crate::state::{
    CareerRecommendation, CareerRecommendations, Context, FormattedOutput, InterestProfile,
    MarketTrends, PersonalityProfile, PersonalityTrait, ProficiencyLevel, SkillProfile,
    UserProfileInput,
};
use std::collections::BTreeMap;

const FALLBACK_REASONING: &str = "Fallback analysis due to system error.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fully populated Context built from fixed generic records
pub fn fallback_context(user_input: UserProfileInput) -> Context {
    let interest_profile = InterestProfile {
        primary_interests: strings(&["Technology & Engineering", "Business & Finance"]),
        interest_scores: BTreeMap::from([
            ("Technology & Engineering".to_string(), 70.0),
            ("Business & Finance".to_string(), 60.0),
        ]),
        reasoning: FALLBACK_REASONING.to_string(),
    };

    let skill_profile = SkillProfile {
        technical_skills: strings(&["Communication", "Problem Solving"]),
        soft_skills: strings(&["Teamwork", "Leadership"]),
        skill_levels: BTreeMap::from([(
            "Communication".to_string(),
            ProficiencyLevel::Intermediate,
        )]),
        experience_years: None,
        reasoning: FALLBACK_REASONING.to_string(),
    };

    let personality_profile = PersonalityProfile {
        trait_scores: PersonalityTrait::default_scores(),
        work_style_preferences: strings(&["Collaborative environment"]),
        team_dynamics: "Works well in teams".to_string(),
        reasoning: FALLBACK_REASONING.to_string(),
    };

    let market_trends = MarketTrends {
        trending_careers: strings(&["Business Analyst", "Project Manager"]),
        growth_sectors: strings(&["Technology", "Business Services"]),
        salary_insights: BTreeMap::new(),
        job_outlook: BTreeMap::new(),
        reasoning: FALLBACK_REASONING.to_string(),
    };

    let career_recommendations = CareerRecommendations {
        top_recommendations: vec![CareerRecommendation {
            title: "Business Analyst".to_string(),
            match_score: 75.0,
            required_skills: strings(&["Analysis", "Communication"]),
            education_requirements: "Bachelor's degree".to_string(),
            salary_range: "$50,000 - $80,000".to_string(),
            job_outlook: "Positive".to_string(),
            why_recommended: "Good general career option".to_string(),
        }],
        alternative_paths: strings(&["Project Coordinator"]),
        next_steps: strings(&["Research careers", "Update resume"]),
        reasoning: FALLBACK_REASONING.to_string(),
    };

    let formatted_output = FormattedOutput {
        summary: "We've provided general career recommendations for you.".to_string(),
        detailed_report: "Due to a system error, we've provided general recommendations. Please try again later for a more detailed analysis.".to_string(),
        action_plan: strings(&["Research recommended careers", "Consider skill development"]),
        resources: strings(&["LinkedIn Learning", "Professional associations"]),
    };

    Context::complete(
        user_input,
        interest_profile,
        skill_profile,
        personality_profile,
        market_trends,
        career_recommendations,
        formatted_output,
    )
}
