//! Default prompt templates bundled at compile time.
//!
//! Templates use `{variable}` placeholders. Rendering fails when a
//! placeholder has no bound value, so an incomplete request is never sent.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Template variable name -> substituted text
pub type Variables = BTreeMap<&'static str, String>;

/// Interest Profiler - maps interests onto the category taxonomy
pub const INTEREST_PROFILER: &str = include_str!("defaults/interest_profiler.md");

/// Skill Evaluator - extracts and grades skills
pub const SKILL_EVALUATOR: &str = include_str!("defaults/skill_evaluator.md");

/// Personality Mapper - Big Five to work style
pub const PERSONALITY_MAPPER: &str = include_str!("defaults/personality_mapper.md");

/// Market Trend Analyzer - careers and sectors in demand
pub const MARKET_TREND_ANALYZER: &str = include_str!("defaults/market_trend_analyzer.md");

/// Career Recommender - synthesizes all earlier records
pub const CAREER_RECOMMENDER: &str = include_str!("defaults/career_recommender.md");

/// Output Formatter - user-facing report
pub const OUTPUT_FORMATTER: &str = include_str!("defaults/output_formatter.md");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("template variable '{0}' has no value")]
    MissingVariable(String),
}

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Placeholder names in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Substitute every `{variable}`. Substituted text is not re-scanned.
pub fn render(template: &str, variables: &Variables) -> Result<String, RenderError> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|name| !variables.contains_key(name))
    {
        return Err(RenderError::MissingVariable(missing.to_string()));
    }

    let rendered = placeholder().replace_all(template, |caps: &regex::Captures<'_>| {
        variables
            .get(&caps[1])
            .cloned()
            .unwrap_or_default()
    });
    Ok(rendered.trim().to_string())
}
