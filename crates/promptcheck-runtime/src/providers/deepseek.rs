//! DeepSeek provider (OpenAI-compatible chat completions).

use async_trait::async_trait;

use super::{
    openai::chat_completions,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use crate::config::{ConfigError, LlmSettings, ProviderKind};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// DeepSeek provider.
pub struct DeepSeekProvider {
    credential: ApiCredential,
    base_url: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl DeepSeekProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "DeepSeek API key",
        ))
    }

    pub fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEEPSEEK_BASE_URL.to_string(),
            config: CompletionConfig::new(DEEPSEEK_DEFAULT_MODEL),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let mut provider =
            Self::with_credential(settings.require_credential(ProviderKind::DeepSeek)?);
        if let Some(url) = &settings.base_url {
            provider.base_url = url.clone();
        }
        if let Some(model) = &settings.model {
            provider.config.model = model.clone();
        }
        Ok(provider)
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        chat_completions(&self.base_url, &self.credential, messages, config).await
    }

    fn name(&self) -> &str {
        "deepseek"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let provider = DeepSeekProvider::new("ds-key");
        assert_eq!(provider.name(), "deepseek");
        assert_eq!(provider.config().model, "deepseek-chat");
        assert_eq!(provider.base_url, "https://api.deepseek.com");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let provider = DeepSeekProvider::new("ds-super-secret");
        assert!(!format!("{:?}", provider).contains("ds-super-secret"));
    }
}
