//! # Reasoning Service
//!
//! The seam between the stages and the external completion service. Stages
//! only see [`ReasoningService`]; the HTTP adapter and the scripted fake are
//! interchangeable behind it.

use crate::models::ModelConfig;
use crate::orchestrator::PipelineStage;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Service-level failures. The stage contract treats all of them alike.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("no API key found in ${0}")]
    MissingApiKey(&'static str),

    #[error("authentication rejected (HTTP {0})")]
    Auth(u16),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("service returned an empty response")]
    EmptyResponse,
}

/// One request to the reasoning service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Stage issuing the request
    pub stage: PipelineStage,
    /// Fully rendered prompt
    pub prompt: String,
    /// JSON schema of the record the stage expects back
    pub schema: serde_json::Value,
}

/// Text-completion capability asked to answer in JSON
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Return the raw completion text for `request`
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

const JSON_INSTRUCTION: &str =
    "Respond in JSON format only. Ensure all required fields are included.";

/// Reasoning service backed by an OpenAI-compatible chat-completions API
pub struct HttpReasoningService {
    config: ModelConfig,
    client: reqwest::Client,
}

impl HttpReasoningService {
    pub fn new(config: ModelConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn system_prompt(schema: &serde_json::Value) -> String {
        let schema = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
        format!(
            "{}\n\nThe JSON object must match this schema:\n{}",
            JSON_INSTRUCTION, schema
        )
    }
}

#[async_trait]
impl ReasoningService for HttpReasoningService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        // Self-hosted endpoints usually run without a key
        let api_key = self.config.api_key();
        if api_key.is_none() && self.config.base_url.is_none() {
            return Err(LlmError::MissingApiKey(self.config.provider.api_key_env()));
        }

        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": Self::system_prompt(&request.schema)},
                {"role": "user", "content": request.prompt},
            ],
        });

        let mut builder = self.client.post(self.config.completions_url()).json(&body);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::Http(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(LlmError::Auth(status.as_u16())),
            429 => return Err(LlmError::RateLimited),
            _ if !status.is_success() => {
                return Err(LlmError::Http(format!(
                    "HTTP {} from {}",
                    status,
                    self.config.provider.display_name()
                )))
            }
            _ => {}
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        payload
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Scripted reply for one stage of a [`FakeReasoningService`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Raw completion text
    Text(String),
    /// Service-level failure
    Failure(LlmError),
    /// Panic inside the call, simulating a bug rather than a service error
    Panic,
}

/// Deterministic service double keyed by stage.
///
/// Stages without a scripted reply get [`LlmError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct FakeReasoningService {
    replies: HashMap<PipelineStage, ScriptedReply>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeReasoningService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `stage` with `value` serialized as JSON text
    pub fn with_json(self, stage: PipelineStage, value: serde_json::Value) -> Self {
        self.with_text(stage, value.to_string())
    }

    pub fn with_text(mut self, stage: PipelineStage, text: impl Into<String>) -> Self {
        self.replies.insert(stage, ScriptedReply::Text(text.into()));
        self
    }

    pub fn with_failure(mut self, stage: PipelineStage, error: LlmError) -> Self {
        self.replies.insert(stage, ScriptedReply::Failure(error));
        self
    }

    pub fn with_panic(mut self, stage: PipelineStage) -> Self {
        self.replies.insert(stage, ScriptedReply::Panic);
        self
    }

    /// Requests received so far, in call order
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl ReasoningService for FakeReasoningService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        match self.replies.get(&request.stage) {
            Some(ScriptedReply::Text(text)) => Ok(text.clone()),
            Some(ScriptedReply::Failure(error)) => Err(error.clone()),
            Some(ScriptedReply::Panic) => panic!("scripted panic in stage {}", request.stage),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LlmProvider;

    fn request(stage: PipelineStage) -> CompletionRequest {
        CompletionRequest {
            stage,
            prompt: "prompt".into(),
            schema: json!({}),
        }
    }

    #[tokio::test]
    async fn test_fake_returns_scripted_json() {
        let fake = FakeReasoningService::new()
            .with_json(PipelineStage::InterestProfiling, json!({"ok": true}));

        let text = fake
            .complete(&request(PipelineStage::InterestProfiling))
            .await
            .unwrap();
        assert_eq!(text, r#"{"ok":true}"#);
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fake_unscripted_stage_errors() {
        let fake = FakeReasoningService::new()
            .with_failure(PipelineStage::SkillEvaluation, LlmError::RateLimited);

        let err = fake
            .complete(&request(PipelineStage::SkillEvaluation))
            .await
            .unwrap_err();
        assert_eq!(err, LlmError::RateLimited);

        let err = fake
            .complete(&request(PipelineStage::MarketAnalysis))
            .await
            .unwrap_err();
        assert_eq!(err, LlmError::EmptyResponse);
        assert_eq!(fake.calls().len(), 2);
    }

    #[test]
    fn test_http_service_requires_key_without_base_url() {
        let config = ModelConfig::with_provider(LlmProvider::Grok, "grok-2");
        let service = HttpReasoningService::new(config).unwrap();

        std::env::remove_var("XAI_API_KEY");
        let err = tokio_test::block_on(service.complete(&request(PipelineStage::MarketAnalysis)))
            .unwrap_err();
        assert_eq!(err, LlmError::MissingApiKey("XAI_API_KEY"));
    }

    #[test]
    fn test_system_prompt_embeds_schema() {
        let prompt = HttpReasoningService::system_prompt(&json!({"type": "object"}));
        assert!(prompt.starts_with(JSON_INSTRUCTION));
        assert!(prompt.contains("\"type\": \"object\""));
    }
}
