//! Google Gemini provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use crate::config::{ConfigError, LlmSettings, ProviderKind};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini provider.
///
/// The key travels in the `x-goog-api-key` header, never in the URL.
pub struct GeminiProvider {
    credential: ApiCredential,
    base_url: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Google API key",
        ))
    }

    pub fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: GEMINI_BASE_URL.to_string(),
            config: CompletionConfig::new(GEMINI_DEFAULT_MODEL),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let mut provider = Self::with_credential(settings.require_credential(ProviderKind::Google)?);
        if let Some(url) = &settings.base_url {
            provider.base_url = url.clone();
        }
        if let Some(model) = &settings.model {
            provider.config.model = model.clone();
        }
        Ok(provider)
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model.trim_start_matches("models/")
        )
    }
}

/// `generateContent` request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart { text: Some(text) }],
        }
    }
}

impl GeminiRequest {
    /// System messages become `systemInstruction`; assistant turns use the
    /// `model` role.
    fn new(messages: Vec<ChatMessage>, config: &CompletionConfig) -> Self {
        let mut system = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => system.push(msg.content),
                "assistant" => contents.push(GeminiContent::text(Some("model"), msg.content)),
                _ => contents.push(GeminiContent::text(Some("user"), msg.content)),
            }
        }

        let system_instruction =
            (!system.is_empty()).then(|| GeminiContent::text(None, system.join("\n")));

        let generation_config = (config.temperature.is_some() || config.max_tokens.is_some())
            .then(|| GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            });

        Self {
            system_instruction,
            contents,
            generation_config,
        }
    }
}

/// `generateContent` response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

impl GeminiResponse {
    fn into_completion(self, requested_model: &str) -> Result<CompletionResponse, ProviderError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: self
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            stop_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let client = http::client()?;
        let request = GeminiRequest::new(messages, config);

        let response = client
            .post(self.endpoint(&config.model))
            .header("x-goog-api-key", self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(http::transport_error)?;

        let body: GeminiResponse = http::read_json(response).await?;
        body.into_completion(&config.model)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}
