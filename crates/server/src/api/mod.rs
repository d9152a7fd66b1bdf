//! # HTTP API
//!
//! Routes under `/api/v1`.

pub mod counsel;

use axum::Router;
use compass_core::orchestrator::Coordinator;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", counsel::counsel_routes())
        .with_state(state)
}
