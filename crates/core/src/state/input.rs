//! # Profile Input
//!
//! The user-supplied profile a run starts from, plus the fixed vocabularies
//! (traits, interest categories, proficiency levels) the stages validate against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Big Five personality traits
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum PersonalityTrait {
    #[serde(rename = "Openness to Experience")]
    Openness,
    #[serde(rename = "Conscientiousness")]
    Conscientiousness,
    #[serde(rename = "Extraversion")]
    Extraversion,
    #[serde(rename = "Agreeableness")]
    Agreeableness,
    #[serde(rename = "Neuroticism")]
    Neuroticism,
}

impl PersonalityTrait {
    /// Neutral score used when a response or a parsed score is missing
    pub const NEUTRAL_SCORE: f64 = 3.0;

    /// All five traits in canonical order
    pub fn all() -> [PersonalityTrait; 5] {
        [
            PersonalityTrait::Openness,
            PersonalityTrait::Conscientiousness,
            PersonalityTrait::Extraversion,
            PersonalityTrait::Agreeableness,
            PersonalityTrait::Neuroticism,
        ]
    }

    /// Canonical display name (also the JSON key)
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityTrait::Openness => "Openness to Experience",
            PersonalityTrait::Conscientiousness => "Conscientiousness",
            PersonalityTrait::Extraversion => "Extraversion",
            PersonalityTrait::Agreeableness => "Agreeableness",
            PersonalityTrait::Neuroticism => "Neuroticism",
        }
    }

    /// Match a free-form trait name. Case-insensitive; "Openness" is accepted
    /// as a short form of "Openness to Experience".
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("openness") {
            return Some(PersonalityTrait::Openness);
        }
        Self::all()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Five-trait map with every trait at the neutral score
    pub fn default_scores() -> BTreeMap<PersonalityTrait, f64> {
        Self::all()
            .into_iter()
            .map(|t| (t, Self::NEUTRAL_SCORE))
            .collect()
    }
}

/// Career interest taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum InterestCategory {
    #[serde(rename = "Technology & Engineering")]
    Technology,
    #[serde(rename = "Healthcare & Medicine")]
    Healthcare,
    #[serde(rename = "Business & Finance")]
    Business,
    #[serde(rename = "Arts & Creative")]
    Arts,
    #[serde(rename = "Education & Training")]
    Education,
    #[serde(rename = "Science & Research")]
    Science,
    #[serde(rename = "Social Services")]
    Social,
    #[serde(rename = "Law & Government")]
    Law,
    #[serde(rename = "Sports & Recreation")]
    Sports,
    #[serde(rename = "Agriculture & Environment")]
    Agriculture,
}

impl InterestCategory {
    pub fn all() -> [InterestCategory; 10] {
        [
            InterestCategory::Technology,
            InterestCategory::Healthcare,
            InterestCategory::Business,
            InterestCategory::Arts,
            InterestCategory::Education,
            InterestCategory::Science,
            InterestCategory::Social,
            InterestCategory::Law,
            InterestCategory::Sports,
            InterestCategory::Agriculture,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestCategory::Technology => "Technology & Engineering",
            InterestCategory::Healthcare => "Healthcare & Medicine",
            InterestCategory::Business => "Business & Finance",
            InterestCategory::Arts => "Arts & Creative",
            InterestCategory::Education => "Education & Training",
            InterestCategory::Science => "Science & Research",
            InterestCategory::Social => "Social Services",
            InterestCategory::Law => "Law & Government",
            InterestCategory::Sports => "Sports & Recreation",
            InterestCategory::Agriculture => "Agriculture & Environment",
        }
    }

    /// Case-insensitive lookup by display name
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

/// Skill proficiency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyLevel {
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(ProficiencyLevel::Beginner),
            "intermediate" => Some(ProficiencyLevel::Intermediate),
            "advanced" => Some(ProficiencyLevel::Advanced),
            "expert" => Some(ProficiencyLevel::Expert),
            _ => None,
        }
    }
}

/// The profile a user submits before a run.
///
/// Created once before the pipeline starts and never mutated afterwards;
/// the [`Context`](super::Context) only hands out shared references to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileInput {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub education_level: String,
    #[serde(default)]
    pub resume_text: Option<String>,
    /// Interest tags, order-irrelevant, duplicates allowed
    #[serde(default)]
    pub interests: Vec<String>,
    /// Trait name -> questionnaire response on a 1-5 scale
    #[serde(default)]
    pub personality_responses: BTreeMap<String, f64>,
}

impl UserProfileInput {
    pub fn new(name: impl Into<String>, education_level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            education_level: education_level.into(),
            resume_text: None,
            interests: Vec::new(),
            personality_responses: BTreeMap::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_resume(mut self, text: impl Into<String>) -> Self {
        self.resume_text = Some(text.into());
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_response(mut self, trait_name: impl Into<String>, score: f64) -> Self {
        self.personality_responses.insert(trait_name.into(), score);
        self
    }

    /// Resume text, treating blank text as absent
    pub fn resume(&self) -> Option<&str> {
        self.resume_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Questionnaire response for a trait, neutral when unanswered.
    /// Responses keyed by the short "Openness" name are honoured too.
    pub fn trait_response(&self, personality_trait: PersonalityTrait) -> f64 {
        self.personality_responses
            .iter()
            .find(|(name, _)| PersonalityTrait::parse(name) == Some(personality_trait))
            .map(|(_, score)| *score)
            .unwrap_or(PersonalityTrait::NEUTRAL_SCORE)
    }
}
