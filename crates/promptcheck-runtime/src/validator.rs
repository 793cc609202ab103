//! Prompt validation round trip.
//!
//! Composition of the validation request lives in
//! [`promptcheck_core::validation`]; this module sends it through a
//! [`PromptDispatcher`] and maps the reply.

use promptcheck_core::{
    build_validation_request, check_response_schema, AgentGoal, ConversationTurn,
    ValidationOutcome,
};

use crate::config::LlmSettings;
use crate::dispatcher::PromptDispatcher;
use crate::providers::{LlmProvider, Provider};
use crate::RuntimeError;

/// Asks a model whether a user prompt makes sense for an agent goal.
#[derive(Debug)]
pub struct PromptValidator<P = Provider> {
    dispatcher: PromptDispatcher<P>,
}

impl PromptValidator<Provider> {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, RuntimeError> {
        Ok(Self::new(PromptDispatcher::from_settings(settings)?))
    }
}

impl<P: LlmProvider> PromptValidator<P> {
    pub fn new(dispatcher: PromptDispatcher<P>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &PromptDispatcher<P> {
        &self.dispatcher
    }

    /// Validate `prompt` against `goal` and the conversation so far.
    ///
    /// A reply that parses but does not match the expected shape is logged
    /// and mapped with defaults (`false`, `{}`) for missing keys.
    pub async fn validate(
        &self,
        goal: &AgentGoal,
        history: &[ConversationTurn],
        prompt: &str,
    ) -> Result<ValidationOutcome, RuntimeError> {
        let request = build_validation_request(goal, history, prompt);
        let response = self.dispatcher.dispatch(&request).await?;

        if let Err(errors) = check_response_schema(&response) {
            tracing::warn!(
                provider = self.dispatcher.provider().name(),
                errors = ?errors,
                "Validation reply does not match expected shape"
            );
        }

        let outcome = ValidationOutcome::from_response(&response);
        tracing::info!(
            valid = outcome.validation_result,
            next = outcome.next_step().unwrap_or(""),
            "Prompt validated"
        );
        Ok(outcome)
    }
}
