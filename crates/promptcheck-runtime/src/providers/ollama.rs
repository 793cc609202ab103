//! Ollama (local model server) provider.
//!
//! Needs no credential. The model comes from `OLLAMA_MODEL_NAME`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{http, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError};
use crate::config::{LlmSettings, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

/// Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    config: CompletionConfig,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_MODEL)
    }
}

impl OllamaProvider {
    /// Create a provider for a locally served model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            config: CompletionConfig::new(model),
        }
    }

    /// Create from loaded settings.
    ///
    /// `LLM_MODEL`/`LLM_BASE_URL` take precedence over the Ollama-specific keys.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| settings.ollama_model.clone());
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| settings.ollama_base_url.clone());

        Self::new(model).with_base_url(base_url)
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// `/api/chat` request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl OllamaRequest {
    fn new(messages: Vec<ChatMessage>, config: &CompletionConfig) -> Self {
        let options = (config.temperature.is_some() || config.max_tokens.is_some()).then(|| {
            OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            }
        });

        Self {
            model: config.model.clone(),
            messages,
            stream: false,
            options,
        }
    }
}

/// `/api/chat` response format (non-streaming).
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl From<OllamaResponse> for CompletionResponse {
    fn from(body: OllamaResponse) -> Self {
        CompletionResponse {
            content: body.message.content,
            model: body.model,
            stop_reason: body.done_reason,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let client = http::client()?;
        let request = OllamaRequest::new(messages, config);

        let response = client
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(http::transport_error)?;

        let body: OllamaResponse = http::read_json(response).await?;
        Ok(body.into())
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}
