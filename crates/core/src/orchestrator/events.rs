//! # Pipeline Events
//!
//! Progress and diagnostic events emitted while a run executes.

use super::pipeline::PipelineStage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of pipeline event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventKind {
    /// Run started
    PipelineStarted,
    /// Stage started working
    StageStarted,
    /// Stage stored a record derived from the service response
    StageCompleted,
    /// Stage stored its fallback record
    StageFellBack,
    /// All six stages finished
    PipelineCompleted,
    /// Whole-pipeline fallback was returned
    PipelineFailed,
}

/// An event in a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: PipelineEventKind,
    /// Stage the event refers to
    pub stage: PipelineStage,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PipelineEvent {
    /// Create a new event
    pub fn new(kind: PipelineEventKind, stage: PipelineStage) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            stage,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Time-ordered, collision-resistant event id
fn event_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let salt = RandomState::new().build_hasher().finish() as u32;
    format!("{:x}-{:x}", nanos, salt)
}
