//! Prompt dispatch: provider call, then JSON extraction.

use promptcheck_core::{extract_object, ParsedResponse, PromptRequest};

use crate::config::LlmSettings;
use crate::providers::{LlmProvider, Provider};
use crate::RuntimeError;

/// Sends prompts to one configured backend and returns the JSON object
/// recovered from its reply.
///
/// The provider is fixed at construction. Each [`dispatch`] is independent;
/// the dispatcher holds no per-call state and can be shared across tasks.
///
/// [`dispatch`]: PromptDispatcher::dispatch
#[derive(Debug)]
pub struct PromptDispatcher<P = Provider> {
    provider: P,
}

impl PromptDispatcher<Provider> {
    /// Build the dispatcher for the provider selected by `settings`.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, RuntimeError> {
        Ok(Self::new(Provider::from_settings(settings)?))
    }
}

impl<P: LlmProvider> PromptDispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Send a request and parse the reply.
    ///
    /// Provider failures and malformed replies propagate unchanged; no
    /// default object is ever substituted.
    pub async fn dispatch(&self, request: &PromptRequest) -> Result<ParsedResponse, RuntimeError> {
        let provider = self.provider.name();
        tracing::info!(provider, model = %self.provider.config().model, "Dispatching prompt");

        let raw = self
            .provider
            .send(&request.context_instructions, &request.prompt)
            .await
            .map_err(|e| {
                tracing::warn!(provider, error = %e, "Provider call failed");
                e
            })?;
        tracing::debug!(provider, raw = %raw, "Provider reply");

        let parsed = extract_object(&raw).map_err(|e| {
            tracing::warn!(provider, error = %e, raw = %raw, "Malformed provider reply");
            e
        })?;

        Ok(parsed)
    }
}
