//! OpenAI-compatible chat-completions client.
//!
//! One blocking round trip per call, no streaming. Transient failures
//! (429/5xx/network) are retried a bounded number of times with doubling
//! backoff; everything else surfaces immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::LlmConfig;
use super::{ChatMessage, CompletionClient, LlmError};

/// Maximum number of attempts per request.
const MAX_ATTEMPTS: u32 = 3;

/// Initial backoff delay; doubles per retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is worth retrying.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504 | 529)
}

/// Chat-completions client against any OpenAI-compatible endpoint.
pub struct OpenAiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a client from configuration.
    ///
    /// Resolves the API key (env var over config file) and builds a reqwest
    /// client with the configured whole-request timeout.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    fn build_request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": messages,
        })
    }

    async fn send_once(&self, body: &serde_json::Value) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_millis(INITIAL_BACKOFF_MS),
                });
            }
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = self.build_request_body(messages);

        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);
        let mut attempt = 1;
        loop {
            debug!(model = %self.model, attempt, "sending completion request");
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < MAX_ATTEMPTS && should_retry(&err) => {
                    warn!(attempt, error = %err, "completion request failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn should_retry(err: &LlmError) -> bool {
    match err {
        LlmError::ApiError { status, .. } => is_retryable_status(*status),
        _ => err.is_retryable(),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
