//! # Counsel API
//!
//! Health check, stage listing and the counseling run itself.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use compass_core::stages::StageDescriptor;
use compass_core::state::{validate_profile, Context, UserProfileInput, ValidationIssue};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Body returned with 422 when the profile fails validation
#[derive(Debug, Serialize)]
pub struct InvalidProfileResponse {
    pub error: String,
    pub issues: Vec<ValidationIssue>,
}

pub struct InvalidProfile(Vec<ValidationIssue>);

impl IntoResponse for InvalidProfile {
    fn into_response(self) -> Response {
        let body = InvalidProfileResponse {
            error: format!("Profile has {} invalid field(s)", self.0.len()),
            issues: self.0,
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

pub fn counsel_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(get_health))
        .route("/stages", get(get_stages))
        .route("/counsel", post(post_counsel))
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_stages(State(state): State<AppState>) -> Json<Vec<StageDescriptor>> {
    Json(state.coordinator.stage_descriptors())
}

/// Validate the profile, then run the full pipeline
async fn post_counsel(
    State(state): State<AppState>,
    Json(input): Json<UserProfileInput>,
) -> Result<Json<Context>, InvalidProfile> {
    validate_profile(&input).map_err(|issues| {
        tracing::info!(issues = issues.len(), "Rejected invalid profile");
        InvalidProfile(issues)
    })?;

    let context = state.coordinator.process_input(input).await;
    Ok(Json(context))
}
