//! # Counselor Configuration
//!
//! Loaded once at startup from `.compass/config.json` and injected into the
//! [`Coordinator`](crate::orchestrator::Coordinator). Environment variables
//! override file values.

use crate::models::{LlmProvider, ModelConfig};
use crate::orchestrator::PipelineStage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default config location, relative to the working directory
pub const CONFIG_PATH: &str = ".compass/config.json";

pub const ENV_PROVIDER: &str = "COMPASS_PROVIDER";
pub const ENV_MODEL: &str = "COMPASS_MODEL";
pub const ENV_BASE_URL: &str = "COMPASS_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounselorConfig {
    /// Global LLM provider
    pub provider: LlmProvider,
    /// Global model; the provider's default when unset
    pub model: Option<String>,
    /// Base URL override for OpenAI-compatible endpoints
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout enforced by the HTTP adapter
    pub timeout_secs: u64,
    /// Per-stage model overrides (stage id -> model name)
    pub per_stage_models: HashMap<String, String>,
    /// Per-stage provider overrides (stage id -> provider)
    pub per_stage_providers: HashMap<String, LlmProvider>,
}

impl Default for CounselorConfig {
    fn default() -> Self {
        let model = ModelConfig::default();
        Self {
            provider: model.provider,
            model: None,
            base_url: None,
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            timeout_secs: model.timeout_secs,
            per_stage_models: HashMap::new(),
            per_stage_providers: HashMap::new(),
        }
    }
}

impl CounselorConfig {
    /// Load from [`CONFIG_PATH`] and apply environment overrides
    pub async fn load() -> Result<Self> {
        let mut config = Self::load_from(&PathBuf::from(CONFIG_PATH)).await?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file. A missing file yields defaults; a malformed one
    /// is an error.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if tokio::fs::metadata(path).await.is_err() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed config file: {:?}", path))
    }

    /// Apply `COMPASS_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(name) = lookup(ENV_PROVIDER) {
            match LlmProvider::parse(&name) {
                Some(provider) => self.provider = provider,
                None => tracing::warn!(provider = %name, "Ignoring unknown {}", ENV_PROVIDER),
            }
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = Some(model);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
    }

    /// Resolve the model settings for one stage
    pub fn model_config_for(&self, stage: PipelineStage) -> ModelConfig {
        // Provider: per-stage override -> global
        let provider = self
            .per_stage_providers
            .get(stage.id())
            .copied()
            .unwrap_or(self.provider);

        // Model: per-stage override -> global -> provider default
        let model = self
            .per_stage_models
            .get(stage.id())
            .or(self.model.as_ref())
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string());

        let mut config = ModelConfig::with_provider(provider, model);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        ModelConfig {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            ..config
        }
    }
}
