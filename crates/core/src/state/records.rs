//! # Stage Records
//!
//! The six typed records the pipeline stages produce. Each record is created
//! by exactly one stage and only read afterwards.

use super::input::{PersonalityTrait, ProficiencyLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interest analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterestProfile {
    /// Top 3 interest categories, strongest first
    pub primary_interests: Vec<String>,
    /// Score 0-100 per interest category
    pub interest_scores: BTreeMap<String, f64>,
    /// Explanation of the interest analysis
    pub reasoning: String,
}

/// Skill evaluation results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkillProfile {
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    /// Skill name -> proficiency
    #[serde(default)]
    pub skill_levels: BTreeMap<String, ProficiencyLevel>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    pub reasoning: String,
}

impl SkillProfile {
    /// Technical skills followed by soft skills
    pub fn all_skills(&self) -> Vec<String> {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .cloned()
            .collect()
    }
}

/// Personality mapping results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonalityProfile {
    /// Big Five trait scores on a 1-5 scale
    pub trait_scores: BTreeMap<PersonalityTrait, f64>,
    pub work_style_preferences: Vec<String>,
    pub team_dynamics: String,
    pub reasoning: String,
}

/// Market trend analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketTrends {
    pub trending_careers: Vec<String>,
    pub growth_sectors: Vec<String>,
    /// Career -> salary range text
    #[serde(default)]
    pub salary_insights: BTreeMap<String, String>,
    /// Career -> outlook text
    #[serde(default)]
    pub job_outlook: BTreeMap<String, String>,
    pub reasoning: String,
}

/// A single career recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CareerRecommendation {
    pub title: String,
    /// Match score 0-100
    pub match_score: f64,
    pub required_skills: Vec<String>,
    pub education_requirements: String,
    pub salary_range: String,
    pub job_outlook: String,
    pub why_recommended: String,
}

/// Complete career recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CareerRecommendations {
    /// Top 3-5 recommendations
    pub top_recommendations: Vec<CareerRecommendation>,
    #[serde(default)]
    pub alternative_paths: Vec<String>,
    pub next_steps: Vec<String>,
    pub reasoning: String,
}

/// Final user-facing report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormattedOutput {
    pub summary: String,
    pub detailed_report: String,
    pub action_plan: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl FormattedOutput {
    /// Plain-text rendering of the report for terminals
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str("# Summary\n\n");
        out.push_str(self.summary.trim());
        out.push_str("\n\n# Report\n\n");
        out.push_str(self.detailed_report.trim());
        out.push_str("\n\n# Action Plan\n\n");
        for (i, step) in self.action_plan.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, step));
        }
        if !self.resources.is_empty() {
            out.push_str("\n# Resources\n\n");
            for resource in &self.resources {
                out.push_str(&format!("- {}\n", resource));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_skills_order() {
        let profile = SkillProfile {
            technical_skills: vec!["Rust".into(), "SQL".into()],
            soft_skills: vec!["Mentoring".into()],
            skill_levels: BTreeMap::new(),
            experience_years: None,
            reasoning: String::new(),
        };
        assert_eq!(profile.all_skills(), vec!["Rust", "SQL", "Mentoring"]);
    }

    #[test]
    fn test_report_numbers_action_plan() {
        let output = FormattedOutput {
            summary: "Short".into(),
            detailed_report: "Long".into(),
            action_plan: vec!["Read".into(), "Apply".into()],
            resources: vec![],
        };
        let report = output.to_report();
        assert!(report.contains("1. Read\n2. Apply"));
        assert!(!report.contains("# Resources"));
    }

    #[test]
    fn test_personality_profile_uses_canonical_keys() {
        let profile = PersonalityProfile {
            trait_scores: PersonalityTrait::default_scores(),
            work_style_preferences: vec![],
            team_dynamics: String::new(),
            reasoning: String::new(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["trait_scores"]["Openness to Experience"], 3.0);
    }
}
