//! Generative-backend configuration.

use serde::{Deserialize, Serialize};

use super::LlmError;

/// Settings for the chat-completions client.
///
/// Embedded in the `[llm]` section of the config file; every field has a
/// default so a bare section is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// API key; the `CITYFORGE_LLM_API_KEY` env var takes priority.
    pub api_key: Option<String>,
    /// Completion token cap per request.
    pub max_tokens: u32,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: env var first, then the config file value.
    pub fn resolve_api_key(&self) -> Result<String, LlmError> {
        if let Ok(key) = std::env::var("CITYFORGE_LLM_API_KEY") {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)
    }
}
