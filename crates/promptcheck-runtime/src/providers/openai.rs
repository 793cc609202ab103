//! OpenAI chat-completions provider.
//!
//! The wire types here also serve OpenAI-compatible backends
//! (see [`DeepSeekProvider`](super::DeepSeekProvider)).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use crate::config::{ConfigError, LlmSettings, ProviderKind};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI provider.
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a new OpenAI provider from a raw API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "OpenAI API key",
        ))
    }

    pub fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: OPENAI_BASE_URL.to_string(),
            config: CompletionConfig::new(OPENAI_DEFAULT_MODEL),
        }
    }

    /// Create from loaded settings.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let mut provider = Self::with_credential(settings.require_credential(ProviderKind::OpenAi)?);
        if let Some(url) = &settings.base_url {
            provider.base_url = url.clone();
        }
        if let Some(model) = &settings.model {
            provider.config.model = model.clone();
        }
        Ok(provider)
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub(super) fn new(messages: Vec<ChatMessage>, config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    choices: Vec<Choice>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice.
    pub(super) fn into_completion(self) -> Result<CompletionResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: self.model,
            stop_reason: choice.finish_reason,
        })
    }
}

/// POST `{base_url}/chat/completions` with bearer auth.
pub(super) async fn chat_completions(
    base_url: &str,
    credential: &ApiCredential,
    messages: Vec<ChatMessage>,
    config: &CompletionConfig,
) -> Result<CompletionResponse, ProviderError> {
    let client = http::client()?;
    let request = ChatCompletionRequest::new(messages, config);

    let response = client
        .post(format!("{}/chat/completions", base_url.trim_end_matches('/')))
        .bearer_auth(credential.expose())
        .json(&request)
        .send()
        .await
        .map_err(http::transport_error)?;

    let body: ChatCompletionResponse = http::read_json(response).await?;
    body.into_completion()
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        chat_completions(&self.base_url, &self.credential, messages, config).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}
