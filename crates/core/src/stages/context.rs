//! # Context Extraction
//!
//! Turns profile input and earlier stage records into the short text
//! summaries substituted into later prompts.

use crate::orchestrator::PipelineStage;
use crate::state::{Context, UserProfileInput};
use serde::Serialize;

/// Sentinel for an empty list or mapping
pub const NONE_PROVIDED: &str = "None provided";
/// Sentinel for an earlier record that is not available
pub const NO_DATA: &str = "No data available";
/// Sentinel when no extra context can be derived
pub const NO_ADDITIONAL_CONTEXT: &str = "No additional context";
/// Sentinel for a missing resume
pub const NO_RESUME: &str = "No resume provided";

const RESUME_PREVIEW_CHARS: usize = 200;
const KEY_SKILLS: usize = 5;

pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return NONE_PROVIDED.to_string();
    }
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pretty JSON for a mapping, or the sentinel when it is empty
pub fn format_map<M: Serialize>(map: &M) -> String {
    match serde_json::to_value(map) {
        Ok(serde_json::Value::Object(obj)) if obj.is_empty() => NONE_PROVIDED.to_string(),
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        Err(_) => NONE_PROVIDED.to_string(),
    }
}

/// Pretty JSON for an earlier stage's record
pub fn format_record<R: Serialize>(record: Option<&R>) -> String {
    match record {
        None => NO_DATA.to_string(),
        Some(record) => format_map(record),
    }
}

/// First `max` characters of `text`, on a char boundary
pub fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Extra context for the interest stage: a resume preview and whether
/// personality responses were given.
pub fn additional_context(input: &UserProfileInput) -> String {
    let mut parts = Vec::new();

    if let Some(resume) = input.resume() {
        parts.push(format!(
            "Resume mentions: {}...",
            preview(resume, RESUME_PREVIEW_CHARS)
        ));
    }
    if !input.personality_responses.is_empty() {
        parts.push("Personality responses provided".to_string());
    }

    if parts.is_empty() {
        NO_ADDITIONAL_CONTEXT.to_string()
    } else {
        parts.join(" | ")
    }
}

/// Summary of what is already known, as seen by `reader`.
///
/// Only records produced by stages that run before `reader` are consulted,
/// so a stage can never observe its own or a later slot.
pub fn basic_context(context: &Context, reader: PipelineStage) -> String {
    let input = context.user_input();
    let mut parts = Vec::new();

    let interests = context
        .interest_profile()
        .filter(|_| PipelineStage::InterestProfiling.precedes(reader));
    match interests {
        Some(profile) => parts.push(format!(
            "Primary interests: {}",
            profile.primary_interests.join(", ")
        )),
        None if !input.interests.is_empty() => parts.push(format!(
            "User stated interests: {}",
            input.interests.join(", ")
        )),
        None => {}
    }

    let skills = context
        .skill_profile()
        .filter(|_| PipelineStage::SkillEvaluation.precedes(reader));
    if let Some(profile) = skills {
        let key_skills: Vec<String> = profile.all_skills().into_iter().take(KEY_SKILLS).collect();
        parts.push(format!("Key skills: {}", key_skills.join(", ")));
    }

    parts.push(format!("Education level: {}", input.education_level));

    parts.join(" | ")
}
