//! Provider selection and credentials, loaded once at startup.
//!
//! [`LlmSettings`] is built from environment-style key/value pairs and handed
//! to the dispatcher's constructor. Nothing on the request path reads the
//! environment.
//!
//! | Key                 | Meaning                                               |
//! |---------------------|-------------------------------------------------------|
//! | `LLM_PROVIDER`      | `openai` (default), `ollama`, `google`, `anthropic`, `deepseek` |
//! | `LLM_MODEL`         | Overrides the selected provider's default model       |
//! | `LLM_BASE_URL`      | Overrides the selected provider's API base URL        |
//! | `OPENAI_API_KEY`    | OpenAI credential                                     |
//! | `GOOGLE_API_KEY`    | Google Gemini credential                              |
//! | `ANTHROPIC_API_KEY` | Anthropic credential                                  |
//! | `DEEPSEEK_API_KEY`  | DeepSeek credential                                   |
//! | `OLLAMA_MODEL_NAME` | Local model name (default `qwen2.5:14b`)              |
//! | `OLLAMA_BASE_URL`   | Local server (default `http://localhost:11434`)       |

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::providers::ApiCredential;

pub const LLM_PROVIDER_ENV: &str = "LLM_PROVIDER";
pub const LLM_MODEL_ENV: &str = "LLM_MODEL";
pub const LLM_BASE_URL_ENV: &str = "LLM_BASE_URL";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEEPSEEK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const OLLAMA_MODEL_NAME_ENV: &str = "OLLAMA_MODEL_NAME";
pub const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:14b";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Errors from configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} not set: configure '{env_var}' environment variable")]
    MissingCredential {
        name: &'static str,
        env_var: &'static str,
    },

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Ollama,
    Google,
    Anthropic,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::OpenAi,
        ProviderKind::Ollama,
        ProviderKind::Google,
        ProviderKind::Anthropic,
        ProviderKind::DeepSeek,
    ];

    /// Selector value as written in `LLM_PROVIDER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Google => "google",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Credential key and display name, for providers that need one.
    pub fn credential_env(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ProviderKind::OpenAi => Some((OPENAI_API_KEY_ENV, "OpenAI API key")),
            ProviderKind::Ollama => None,
            ProviderKind::Google => Some((GOOGLE_API_KEY_ENV, "Google API key")),
            ProviderKind::Anthropic => Some((ANTHROPIC_API_KEY_ENV, "Anthropic API key")),
            ProviderKind::DeepSeek => Some((DEEPSEEK_API_KEY_ENV, "DeepSeek API key")),
        }
    }

    /// Lenient selection: unset or unrecognized values pick the default.
    pub fn select(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => ProviderKind::default(),
            Some(v) => v.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    selector = %v,
                    fallback = ProviderKind::default().as_str(),
                    "Unrecognized LLM provider, using default"
                );
                ProviderKind::default()
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: LLM_PROVIDER_ENV,
                value: s.to_string(),
                reason: "expected one of openai, ollama, google, anthropic, deepseek",
            })
    }
}

/// Everything needed to build the active provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Active backend
    pub provider: ProviderKind,

    /// Model override for the active backend
    pub model: Option<String>,

    /// Base URL override for the active backend
    pub base_url: Option<String>,

    pub openai_api_key: Option<ApiCredential>,
    pub google_api_key: Option<ApiCredential>,
    pub anthropic_api_key: Option<ApiCredential>,
    pub deepseek_api_key: Option<ApiCredential>,

    /// Local model served by Ollama
    pub ollama_model: String,

    /// Ollama server address
    pub ollama_base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            base_url: None,
            openai_api_key: None,
            google_api_key: None,
            anthropic_api_key: None,
            deepseek_api_key: None,
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
        }
    }
}

impl LlmSettings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key/value lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = ProviderKind::select(text(LLM_PROVIDER_ENV).as_deref());
        let settings = Self {
            provider,
            model: text(LLM_MODEL_ENV),
            base_url: text(LLM_BASE_URL_ENV),
            openai_api_key: ApiCredential::from_lookup(&lookup, OPENAI_API_KEY_ENV, "OpenAI API key"),
            google_api_key: ApiCredential::from_lookup(&lookup, GOOGLE_API_KEY_ENV, "Google API key"),
            anthropic_api_key: ApiCredential::from_lookup(
                &lookup,
                ANTHROPIC_API_KEY_ENV,
                "Anthropic API key",
            ),
            deepseek_api_key: ApiCredential::from_lookup(
                &lookup,
                DEEPSEEK_API_KEY_ENV,
                "DeepSeek API key",
            ),
            ollama_model: text(OLLAMA_MODEL_NAME_ENV)
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            ollama_base_url: text(OLLAMA_BASE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
        };

        tracing::debug!(provider = %settings.provider, "Loaded LLM settings");
        settings
    }

    /// Replace the active provider.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Replace the model for the active provider.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Credential configured for a provider, if any.
    pub fn credential(&self, kind: ProviderKind) -> Option<&ApiCredential> {
        match kind {
            ProviderKind::OpenAi => self.openai_api_key.as_ref(),
            ProviderKind::Ollama => None,
            ProviderKind::Google => self.google_api_key.as_ref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_ref(),
            ProviderKind::DeepSeek => self.deepseek_api_key.as_ref(),
        }
    }

    /// Credential for a provider that needs one.
    pub fn require_credential(&self, kind: ProviderKind) -> Result<ApiCredential, ConfigError> {
        let (env_var, name) = kind.credential_env().ok_or(ConfigError::InvalidValue {
            key: LLM_PROVIDER_ENV,
            value: kind.to_string(),
            reason: "provider does not use a credential",
        })?;

        self.credential(kind)
            .cloned()
            .ok_or(ConfigError::MissingCredential { name, env_var })
    }

    /// Check that the active provider can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.credential_env().is_some() {
            self.require_credential(self.provider)?;
        }

        if let Some(url) = &self.base_url {
            check_url(LLM_BASE_URL_ENV, url)?;
        }
        if self.provider == ProviderKind::Ollama {
            check_url(OLLAMA_BASE_URL_ENV, &self.ollama_base_url)?;
        }

        Ok(())
    }
}

fn check_url(key: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: url.to_string(),
            reason: "must start with http:// or https://",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> LlmSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LlmSettings::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = settings(&[]);
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.ollama_model, "qwen2.5:14b");
        assert_eq!(settings.ollama_base_url, "http://localhost:11434");
        assert!(settings.model.is_none());
    }

    #[test]
    fn test_provider_selector_is_case_insensitive() {
        assert_eq!(settings(&[("LLM_PROVIDER", "Google")]).provider, ProviderKind::Google);
        assert_eq!(settings(&[("LLM_PROVIDER", "DEEPSEEK")]).provider, ProviderKind::DeepSeek);
    }

    #[test]
    fn test_unrecognized_provider_falls_back_to_default() {
        assert_eq!(settings(&[("LLM_PROVIDER", "nonexistent")]).provider, ProviderKind::OpenAi);
        assert_eq!(settings(&[("LLM_PROVIDER", "")]).provider, ProviderKind::OpenAi);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        let err = "gpt".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("LLM_PROVIDER"));
    }

    #[test]
    fn test_as_str_round_trips_through_from_str() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_ollama_overrides() {
        let settings = settings(&[
            ("LLM_PROVIDER", "ollama"),
            ("OLLAMA_MODEL_NAME", "llama3.1:8b"),
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
        ]);
        assert_eq!(settings.ollama_model, "llama3.1:8b");
        assert_eq!(settings.ollama_base_url, "http://gpu-box:11434");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_credential_for_selected_provider() {
        let settings = settings(&[("LLM_PROVIDER", "anthropic"), ("OPENAI_API_KEY", "sk-x")]);
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { env_var: "ANTHROPIC_API_KEY", .. }
        ));
    }

    #[test]
    fn test_empty_credential_counts_as_missing() {
        let settings = settings(&[("OPENAI_API_KEY", "")]);
        assert!(settings.openai_api_key.is_none());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let settings = settings(&[("OPENAI_API_KEY", "sk-x"), ("LLM_BASE_URL", "api.openai.com")]);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { key: "LLM_BASE_URL", .. })
        ));
    }

    #[test]
    fn test_credentials_are_redacted_in_debug() {
        let settings = settings(&[("OPENAI_API_KEY", "sk-very-secret")]);
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    proptest! {
        #[test]
        fn prop_select_is_total(selector in "\\PC{0,16}") {
            let kind = ProviderKind::select(Some(selector.as_str()));
            let expected = selector.parse::<ProviderKind>().unwrap_or_default();
            prop_assert_eq!(kind, expected);
        }
    }

    #[test]
    fn test_ollama_needs_no_credential() {
        let settings = settings(&[("LLM_PROVIDER", "ollama")]);
        assert!(settings.credential(ProviderKind::Ollama).is_none());
        assert!(settings.validate().is_ok());
    }
}
