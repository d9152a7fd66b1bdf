//! # Compass Models
//!
//! Centralized LLM configuration types. Every provider is reached through an
//! OpenAI-compatible chat-completions endpoint, so a provider only decides the
//! default base URL, default model, and the environment variable holding the
//! API key.

use serde::{Deserialize, Serialize};

/// Supported LLM providers
///
/// - Mistral - `MISTRAL_API_KEY`
/// - OpenAI (or any compatible server via `base_url`) - `OPENAI_API_KEY`
/// - OpenRouter (Gateway) - `OPENROUTER_API_KEY`
/// - Grok (xAI) - `XAI_API_KEY`
/// - DeepSeek - `DEEPSEEK_API_KEY`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Mistral,
    #[serde(rename = "openai")]
    OpenAI,
    OpenRouter,
    Grok,
    DeepSeek,
}

impl LlmProvider {
    /// Get all available providers
    pub fn all() -> Vec<LlmProvider> {
        vec![
            LlmProvider::Mistral,
            LlmProvider::OpenAI,
            LlmProvider::OpenRouter,
            LlmProvider::Grok,
            LlmProvider::DeepSeek,
        ]
    }

    /// Display name for logs and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Mistral => "Mistral",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Grok => "Grok",
            LlmProvider::DeepSeek => "DeepSeek",
        }
    }

    /// Parse a provider name as written in config files or env vars
    pub fn parse(name: &str) -> Option<LlmProvider> {
        let name = name.trim();
        LlmProvider::all()
            .into_iter()
            .find(|p| p.display_name().eq_ignore_ascii_case(name))
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Mistral => "MISTRAL_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Grok => "XAI_API_KEY",
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Chat-completions base URL (without the `/chat/completions` suffix)
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Mistral => "https://api.mistral.ai/v1",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LlmProvider::Grok => "https://api.x.ai/v1",
            LlmProvider::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    /// Model used when neither a global nor a per-stage model is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Mistral => "ministral-8b-latest",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::OpenRouter => "mistralai/ministral-8b",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }
}

/// Configuration for one reasoning-service client
///
/// ## Example
/// ```rust,ignore
/// use compass_core::models::{LlmProvider, ModelConfig};
///
/// let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o")
///     .with_base_url("http://localhost:11434/v1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    pub model: String,
    /// Optional base URL override (self-hosted or proxy endpoints)
    #[serde(default)]
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Mistral,
            model: LlmProvider::Mistral.default_model().to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Endpoint the HTTP adapter posts to
    pub fn completions_url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url());
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    /// API key from the provider's environment variable, if set
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.provider.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, LlmProvider::Mistral);
        assert_eq!(config.model, "ministral-8b-latest");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_provider_display_names() {
        assert_eq!(LlmProvider::Mistral.display_name(), "Mistral");
        assert_eq!(LlmProvider::OpenAI.display_name(), "OpenAI");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("openai"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse(" DeepSeek "), Some(LlmProvider::DeepSeek));
        assert_eq!(LlmProvider::parse("anthropic"), None);
    }

    #[test]
    fn test_completions_url() {
        let config = ModelConfig::default();
        assert_eq!(
            config.completions_url(),
            "https://api.mistral.ai/v1/chat/completions"
        );

        let local = ModelConfig::with_provider(LlmProvider::OpenAI, "llama3")
            .with_base_url("http://localhost:11434/v1/");
        assert_eq!(
            local.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("openai"));
        assert!(json.contains("gpt-4o"));
    }
}
