//! Anthropic Messages API adapter.
//!
//! The key goes in `x-api-key`; the system prompt is a top-level field
//! rather than a message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use crate::config::{ConfigError, LlmSettings, ProviderKind};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// The Messages API requires `max_tokens`; used when the config leaves it unset.
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude via the Messages API. `Debug` redacts the key.
pub struct AnthropicProvider {
    credential: ApiCredential,
    base_url: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AnthropicProvider {
    /// Provider for an explicitly supplied key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Anthropic API key",
        ))
    }

    pub fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            config: CompletionConfig {
                max_tokens: Some(ANTHROPIC_DEFAULT_MAX_TOKENS),
                ..CompletionConfig::new(ANTHROPIC_DEFAULT_MODEL)
            },
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let mut provider =
            Self::with_credential(settings.require_credential(ProviderKind::Anthropic)?);
        if let Some(url) = &settings.base_url {
            provider.base_url = url.clone();
        }
        if let Some(model) = &settings.model {
            provider.config.model = model.clone();
        }
        Ok(provider)
    }

    /// Point at a proxy or gateway instead of api.anthropic.com.
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        Self {
            base_url: url.into(),
            ..self
        }
    }
}

/// `POST /messages` body.
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

impl AnthropicRequest {
    /// System messages move to the top-level `system` field.
    fn new(messages: Vec<ChatMessage>, config: &CompletionConfig) -> Self {
        let mut system = Vec::new();
        let mut api_messages = Vec::new();

        for msg in messages {
            if msg.is_system() {
                system.push(msg.content);
            } else {
                api_messages.push(AnthropicMessage {
                    role: msg.role,
                    content: vec![ContentBlock::Text { text: msg.content }],
                });
            }
        }

        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS),
            system: (!system.is_empty()).then(|| system.join("\n")),
            messages: api_messages,
            temperature: config.temperature,
        }
    }
}

/// `POST /messages` reply; non-text blocks are ignored.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlockResponse>,
    model: String,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlockResponse {
    text: Option<String>,
}

impl From<AnthropicResponse> for CompletionResponse {
    fn from(body: AnthropicResponse) -> Self {
        let content = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        CompletionResponse {
            content,
            model: body.model,
            stop_reason: body.stop_reason,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let client = http::client()?;
        let request = AnthropicRequest::new(messages, config);

        let response = client
            .post(format!("{}/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(http::transport_error)?;

        let body: AnthropicResponse = http::read_json(response).await?;
        Ok(body.into())
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let provider = AnthropicProvider::new("k");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.config().model, "claude-3-5-sonnet-20241022");
        assert_eq!(provider.config().max_tokens, Some(1024));
    }

    #[test]
    fn test_request_extracts_system_message() {
        let request = AnthropicRequest::new(
            vec![ChatMessage::system("ctx"), ChatMessage::user("hi")],
            &CompletionConfig::new("claude-3-5-sonnet-20241022"),
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 1024,
                "system": "ctx",
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": "hi"}]}
                ]
            })
        );
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let body: AnthropicResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "Here is the JSON: "},
                {"type": "text", "text": "{\"validationResult\": true}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();

        let completion = CompletionResponse::from(body);
        assert_eq!(completion.content, "Here is the JSON: {\"validationResult\": true}");
        assert_eq!(completion.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = AnthropicProvider::new("sk-ant-api03-7Qx9");
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("sk-ant-api03-7Qx9"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("claude-3-5-sonnet-20241022"));
    }

    #[test]
    fn test_from_settings_tracks_source() {
        let settings = LlmSettings::from_lookup(|key| {
            (key == "ANTHROPIC_API_KEY").then(|| "env-key".to_string())
        })
        .with_provider(ProviderKind::Anthropic);

        let provider = AnthropicProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.credential.expose(), "env-key");
        assert_eq!(provider.credential.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_custom_base_url() {
        let provider = AnthropicProvider::new("k").with_base_url("https://proxy.internal/v1");
        assert_eq!(provider.base_url, "https://proxy.internal/v1");
    }
}
