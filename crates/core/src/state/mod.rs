pub mod context;
pub mod input;
pub mod records;
pub mod validation;

pub use context::{Context, ContextError};
pub use input::{InterestCategory, PersonalityTrait, ProficiencyLevel, UserProfileInput};
pub use records::{
    CareerRecommendation, CareerRecommendations, FormattedOutput, InterestProfile, MarketTrends,
    PersonalityProfile, SkillProfile,
};
pub use validation::{validate_profile, ProfileField, ValidationIssue, EDUCATION_LEVELS};
