//! # Profile Validation
//!
//! Field-level checks applied to a [`UserProfileInput`] before a run is
//! started. The pipeline itself never calls these; callers that accept raw
//! user data (CLI, HTTP API) do.

use super::input::{PersonalityTrait, UserProfileInput};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Accepted education levels
pub const EDUCATION_LEVELS: [&str; 9] = [
    "High School",
    "Associate Degree",
    "Bachelor's Degree",
    "Master's Degree",
    "Doctoral Degree",
    "Professional Degree",
    "Some College",
    "Trade/Vocational School",
    "Other",
];

const MAX_INTERESTS: usize = 10;
const MAX_INTEREST_LEN: usize = 100;
const MIN_RESUME_LEN: usize = 50;
const MAX_RESUME_LEN: usize = 50_000;

/// Input field a validation issue refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Age,
    Education,
    Interests,
    Personality,
    Resume,
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field:?}: {message}")]
pub struct ValidationIssue {
    pub field: ProfileField,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: ProfileField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("name pattern is valid"))
}

pub fn validate_name(name: &str) -> Result<(), ValidationIssue> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationIssue::new(ProfileField::Name, "Name cannot be empty"));
    }
    let len = name.chars().count();
    if len < 2 {
        return Err(ValidationIssue::new(
            ProfileField::Name,
            "Name must be at least 2 characters long",
        ));
    }
    if len > 50 {
        return Err(ValidationIssue::new(
            ProfileField::Name,
            "Name must be less than 50 characters",
        ));
    }
    if !name_pattern().is_match(name) {
        return Err(ValidationIssue::new(
            ProfileField::Name,
            "Name can only contain letters, spaces, hyphens, and apostrophes",
        ));
    }
    Ok(())
}

pub fn validate_age(age: Option<u32>) -> Result<(), ValidationIssue> {
    match age {
        Some(age) if !(16..=100).contains(&age) => Err(ValidationIssue::new(
            ProfileField::Age,
            "Age must be between 16 and 100",
        )),
        _ => Ok(()),
    }
}

pub fn validate_education_level(education: &str) -> Result<(), ValidationIssue> {
    if education.trim().is_empty() {
        return Err(ValidationIssue::new(
            ProfileField::Education,
            "Education level is required",
        ));
    }
    if !EDUCATION_LEVELS.contains(&education) {
        return Err(ValidationIssue::new(
            ProfileField::Education,
            format!(
                "Education level must be one of: {}",
                EDUCATION_LEVELS.join(", ")
            ),
        ));
    }
    Ok(())
}

pub fn validate_interests(interests: &[String]) -> Result<(), ValidationIssue> {
    if interests.is_empty() {
        return Err(ValidationIssue::new(
            ProfileField::Interests,
            "At least one interest must be selected",
        ));
    }
    if interests.len() > MAX_INTERESTS {
        return Err(ValidationIssue::new(
            ProfileField::Interests,
            format!("Please select no more than {} interests", MAX_INTERESTS),
        ));
    }
    for interest in interests {
        if interest.trim().is_empty() {
            return Err(ValidationIssue::new(
                ProfileField::Interests,
                "Interest cannot be empty",
            ));
        }
        if interest.chars().count() > MAX_INTEREST_LEN {
            return Err(ValidationIssue::new(
                ProfileField::Interests,
                format!(
                    "Interest description too long (max {} characters)",
                    MAX_INTEREST_LEN
                ),
            ));
        }
    }
    Ok(())
}

/// Every trait must be answered within 1-5. Only called when at least one
/// response was given.
pub fn validate_personality_responses(input: &UserProfileInput) -> Result<(), ValidationIssue> {
    for personality_trait in PersonalityTrait::all() {
        let response = input
            .personality_responses
            .iter()
            .find(|(name, _)| PersonalityTrait::parse(name) == Some(personality_trait))
            .map(|(_, score)| *score);

        match response {
            None => {
                return Err(ValidationIssue::new(
                    ProfileField::Personality,
                    format!("Missing response for {}", personality_trait.as_str()),
                ))
            }
            Some(score) if !(1.0..=5.0).contains(&score) => {
                return Err(ValidationIssue::new(
                    ProfileField::Personality,
                    format!(
                        "Score for {} must be between 1 and 5",
                        personality_trait.as_str()
                    ),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn validate_resume_text(resume: &str) -> Result<(), ValidationIssue> {
    if resume.trim().chars().count() < MIN_RESUME_LEN {
        return Err(ValidationIssue::new(
            ProfileField::Resume,
            format!(
                "Resume text seems too short (minimum {} characters)",
                MIN_RESUME_LEN
            ),
        ));
    }
    if resume.chars().count() > MAX_RESUME_LEN {
        return Err(ValidationIssue::new(
            ProfileField::Resume,
            "Resume text is too long (maximum 50,000 characters)",
        ));
    }
    Ok(())
}

/// Run every field check and collect all failures
pub fn validate_profile(input: &UserProfileInput) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let checks = [
        validate_name(&input.name),
        validate_age(input.age),
        validate_education_level(&input.education_level),
        validate_interests(&input.interests),
    ];
    issues.extend(checks.into_iter().filter_map(Result::err));

    if !input.personality_responses.is_empty() {
        if let Err(issue) = validate_personality_responses(input) {
            issues.push(issue);
        }
    }

    if let Some(resume) = input.resume() {
        if let Err(issue) = validate_resume_text(resume) {
            issues.push(issue);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> UserProfileInput {
        UserProfileInput::new("Grace Hopper", "Master's Degree")
            .with_age(34)
            .with_interests(["Computers", "Teaching"])
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(validate_profile(&valid_input()).is_ok());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("O'Neil-Smith").is_ok());
        assert!(validate_name(" ").is_err());
        assert!(validate_name("A").is_err());
        assert!(validate_name("R2D2").is_err());
        assert!(validate_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_age_bounds() {
        assert!(validate_age(None).is_ok());
        assert!(validate_age(Some(16)).is_ok());
        assert!(validate_age(Some(15)).is_err());
        assert!(validate_age(Some(101)).is_err());
    }

    #[test]
    fn test_unknown_education_level() {
        let issue = validate_education_level("Bootcamp").unwrap_err();
        assert_eq!(issue.field, ProfileField::Education);
    }

    #[test]
    fn test_interest_limits() {
        assert!(validate_interests(&[]).is_err());
        let many: Vec<String> = (0..11).map(|i| format!("Interest {}", i)).collect();
        assert!(validate_interests(&many).is_err());
        assert!(validate_interests(&["".to_string()]).is_err());
    }

    #[test]
    fn test_partial_personality_responses_rejected() {
        let input = valid_input().with_response("Openness", 4.0);
        let issues = validate_profile(&input).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, ProfileField::Personality);
        assert!(issues[0].message.contains("Conscientiousness"));
    }

    #[test]
    fn test_complete_personality_responses_accepted() {
        let mut input = valid_input();
        for t in PersonalityTrait::all() {
            input = input.with_response(t.as_str(), 4.0);
        }
        assert!(validate_profile(&input).is_ok());

        let input = input.with_response("Neuroticism", 7.0);
        assert!(validate_profile(&input).is_err());
    }

    #[test]
    fn test_short_resume_rejected() {
        let input = valid_input().with_resume("Too short");
        let issues = validate_profile(&input).unwrap_err();
        assert_eq!(issues[0].field, ProfileField::Resume);
    }

    #[test]
    fn test_collects_multiple_issues() {
        let input = UserProfileInput::new("", "Unknown").with_age(5);
        let issues = validate_profile(&input).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                ProfileField::Name,
                ProfileField::Age,
                ProfileField::Education,
                ProfileField::Interests
            ]
        );
    }
}
