//! Output Formatter stage: the user-facing report.

use super::context::format_record;
use super::parse::{self, ParseError};
use super::prompts::{self, Variables};
use super::{StageContract, StageInput};
use crate::llm::ReasoningService;
use crate::orchestrator::PipelineStage;
use crate::state::{Context, ContextError, FormattedOutput};
use serde_json::Value;
use std::sync::Arc;

const FALLBACK_REPORT: &str = "\
Based on our comprehensive analysis, we've identified several career opportunities that match your profile:

**Top Career Recommendations:**
1. **Business Analyst** - A great fit for analytical thinking and business problem-solving
2. **Project Coordinator** - Perfect for organized individuals who enjoy managing tasks and timelines
3. **Customer Success Specialist** - Ideal for people-oriented professionals who want to help others succeed

**Your Strengths:**
- Strong analytical and problem-solving abilities
- Good communication and interpersonal skills
- Adaptable and eager to learn new things

**Market Outlook:**
The recommended careers are in high demand with positive growth projections. They offer competitive salaries and opportunities for advancement.

**Next Steps:**
We recommend starting with research and skill development in your areas of interest. Consider networking with professionals in these fields and exploring relevant certifications or training programs.";

pub struct FormattingStage {
    service: Arc<dyn ReasoningService>,
}

impl FormattingStage {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }
}

impl StageContract for FormattingStage {
    type Record = FormattedOutput;

    const STAGE: PipelineStage = PipelineStage::OutputFormatting;
    const TEMPLATE: &'static str = prompts::OUTPUT_FORMATTER;
    const INPUTS: &'static [StageInput] = &[
        StageInput::Name,
        StageInput::CareerRecommendations,
        StageInput::InterestProfile,
        StageInput::SkillProfile,
        StageInput::PersonalityProfile,
    ];

    fn service(&self) -> &dyn ReasoningService {
        self.service.as_ref()
    }

    fn variables(&self, context: &Context) -> Variables {
        let mut vars = Variables::new();
        vars.insert("name", context.user_input().name.clone());
        vars.insert(
            "career_recommendations",
            format_record(context.career_recommendations()),
        );
        vars.insert("interest_profile", format_record(context.interest_profile()));
        vars.insert("skill_profile", format_record(context.skill_profile()));
        vars.insert(
            "personality_profile",
            format_record(context.personality_profile()),
        );
        vars
    }

    fn parse(&self, value: Value) -> Result<FormattedOutput, ParseError> {
        let obj = parse::as_object(&value)?;

        Ok(FormattedOutput {
            summary: parse::required_str(obj, "summary")?,
            detailed_report: parse::required_str(obj, "detailed_report")?,
            action_plan: parse::string_list(obj, "action_plan", true)?,
            resources: parse::string_list(obj, "resources", false)?,
        })
    }

    fn fallback(&self) -> FormattedOutput {
        FormattedOutput {
            summary: "We've analyzed your profile and identified several promising career paths that align with your interests, skills, and the current job market.".to_string(),
            detailed_report: FALLBACK_REPORT.to_string(),
            action_plan: [
                "Research the recommended career paths in detail",
                "Identify skill gaps and create a learning plan",
                "Update your resume to highlight relevant experiences",
                "Start networking with professionals in your target fields",
                "Consider informational interviews to learn more",
                "Apply for relevant entry-level positions or internships",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            resources: [
                "LinkedIn Learning for skill development",
                "Industry-specific professional associations",
                "Local networking events and meetups",
                "Online job boards (Indeed, LinkedIn, Glassdoor)",
                "Career counseling services at educational institutions",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    fn store(context: &mut Context, record: FormattedOutput) -> Result<(), ContextError> {
        context.set_formatted_output(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeReasoningService;
    use crate::stages::{context_before, Stage};
    use crate::state::UserProfileInput;
    use serde_json::json;

    async fn run_with_text(text: &str) -> (FormattedOutput, bool) {
        let fake = Arc::new(
            FakeReasoningService::new().with_text(PipelineStage::OutputFormatting, text),
        );
        let stage = FormattingStage::new(fake);
        let run = stage
            .run(context_before(
                PipelineStage::OutputFormatting,
                UserProfileInput::new("Ada", "Other"),
            ))
            .await
            .unwrap();
        assert!(run.context.is_complete());
        (
            run.context.formatted_output().unwrap().clone(),
            run.outcome.is_fallback(),
        )
    }

    #[tokio::test]
    async fn test_parses_fenced_response() {
        let body = json!({
            "summary": "You would thrive in analytics.",
            "detailed_report": "Long form",
            "action_plan": ["Take a statistics course", "Build a portfolio"]
        });
        let text = format!("Sure! Here is the report:\n```json\n{body}\n```");

        let (output, fell_back) = run_with_text(&text).await;
        assert!(!fell_back);
        assert_eq!(output.summary, "You would thrive in analytics.");
        assert_eq!(output.action_plan.len(), 2);
        assert!(output.resources.is_empty());
    }

    #[tokio::test]
    async fn test_prose_only_falls_back() {
        let (output, fell_back) = run_with_text("I'm sorry, I can't do that.").await;
        assert!(fell_back);
        assert_eq!(output.action_plan.len(), 6);
        assert_eq!(output.resources.len(), 5);
        assert!(output.detailed_report.starts_with("Based on our comprehensive analysis"));
    }

    #[tokio::test]
    async fn test_missing_action_plan_falls_back() {
        let (_, fell_back) =
            run_with_text(r#"{"summary": "s", "detailed_report": "d"}"#).await;
        assert!(fell_back);
    }
}
