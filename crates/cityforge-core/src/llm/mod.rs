//! Generative-backend interface: the [`CompletionClient`] trait and the
//! OpenAI-compatible HTTP implementation.
//!
//! The execution engine only ever issues one blocking "generate completion
//! from messages" round trip at a time; streaming, tool use, and semantic
//! retries are out of scope.

pub mod config;
mod error;
mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use config::LlmConfig;
pub use error::LlmError;
pub use openai::OpenAiClient;

/// Role of one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Adapter interface for the generative text backend.
///
/// # Object Safety
///
/// Object-safe so callers can hold `Arc<dyn CompletionClient>` across
/// spawned execution sequences; tests substitute scripted clients.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round trip: ordered messages in, raw completion text out.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

// Compile-time assertion: CompletionClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionClient) {}
};
