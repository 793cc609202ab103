//! LLM Provider abstractions for promptcheck-runtime.
//!
//! This module defines the [`LlmProvider`] capability and one adapter per
//! supported backend. The adapters form a closed set: [`Provider`] is an
//! enum over all of them, so adding a backend is a compile-time change that
//! every `match` has to acknowledge.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use promptcheck_core::stamp_current_date;

use crate::config::{ConfigError, LlmSettings, ProviderKind};

mod anthropic;
mod deepseek;
mod gemini;
mod http;
mod ollama;
mod openai;
pub mod secrets;

pub use anthropic::AnthropicProvider;
pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

/// Configuration for a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate (provider default when unset)
    pub max_tokens: Option<u32>,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,
}

impl CompletionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

/// Response from an LLM completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Model used
    pub model: String,

    /// Stop reason
    pub stop_reason: Option<String>,
}

/// Provider abstraction allows swapping LLM backends.
///
/// Implementors make exactly one network call per [`complete`] and keep no
/// state between calls. There is no retry, streaming, or timeout here;
/// callers that need a deadline wrap the future themselves.
///
/// [`complete`]: LlmProvider::complete
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Get provider name for logs.
    fn name(&self) -> &str;

    /// Completion settings this provider was built with.
    fn config(&self) -> &CompletionConfig;

    /// Send a context/prompt pair and return the raw reply text.
    ///
    /// Builds exactly two messages: a system message carrying the context
    /// instructions stamped with today's date, and a user message carrying
    /// the prompt.
    async fn send(&self, context_instructions: &str, prompt: &str) -> Result<String, ProviderError> {
        let messages = vec![
            ChatMessage::system(stamp_current_date(context_instructions)),
            ChatMessage::user(prompt),
        ];

        let response = self.complete(messages, self.config()).await?;
        if response.content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        tracing::debug!(
            provider = self.name(),
            model = %response.model,
            stop_reason = ?response.stop_reason,
            "Completion received"
        );
        Ok(response.content)
    }
}

/// The configured backend, one variant per supported provider.
#[derive(Debug)]
pub enum Provider {
    OpenAi(OpenAiProvider),
    Ollama(OllamaProvider),
    Google(GeminiProvider),
    Anthropic(AnthropicProvider),
    DeepSeek(DeepSeekProvider),
}

impl Provider {
    /// Build the provider selected by `settings`.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let provider = match settings.provider {
            ProviderKind::OpenAi => Provider::OpenAi(OpenAiProvider::from_settings(settings)?),
            ProviderKind::Ollama => Provider::Ollama(OllamaProvider::from_settings(settings)),
            ProviderKind::Google => Provider::Google(GeminiProvider::from_settings(settings)?),
            ProviderKind::Anthropic => {
                Provider::Anthropic(AnthropicProvider::from_settings(settings)?)
            }
            ProviderKind::DeepSeek => {
                Provider::DeepSeek(DeepSeekProvider::from_settings(settings)?)
            }
        };

        tracing::info!(
            provider = provider.name(),
            model = %provider.config().model,
            "LLM provider configured"
        );
        Ok(provider)
    }

    /// Which backend this is.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAi(_) => ProviderKind::OpenAi,
            Provider::Ollama(_) => ProviderKind::Ollama,
            Provider::Google(_) => ProviderKind::Google,
            Provider::Anthropic(_) => ProviderKind::Anthropic,
            Provider::DeepSeek(_) => ProviderKind::DeepSeek,
        }
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Provider::OpenAi(p) => p,
            Provider::Ollama(p) => p,
            Provider::Google(p) => p,
            Provider::Anthropic(p) => p,
            Provider::DeepSeek(p) => p,
        }
    }
}

#[async_trait]
impl LlmProvider for Provider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.inner().complete(messages, config).await
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn config(&self) -> &CompletionConfig {
        self.inner().config()
    }
}
