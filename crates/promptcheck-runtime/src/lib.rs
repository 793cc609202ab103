//! # promptcheck-runtime
//!
//! Provider-agnostic LLM dispatch and prompt validation.
//!
//! This crate owns everything that talks to a model: the five provider
//! adapters, the settings that pick one of them, the [`PromptDispatcher`]
//! that turns a reply into a JSON object, and the [`PromptValidator`] built
//! on top of it. Text handling and prompt composition live in
//! `promptcheck-core`.
//!
//! ## Important
//!
//! Every call is a single attempt. There is no retry, caching, or internal
//! timeout; wrap futures with `tokio::time::timeout` when a deadline matters.
//!
//! ## Example
//!
//! ```rust,ignore
//! use promptcheck_core::{AgentGoal, ConversationTurn};
//! use promptcheck_runtime::{LlmSettings, PromptValidator};
//!
//! let validator = PromptValidator::from_settings(&LlmSettings::from_env())?;
//! let goal = AgentGoal::from_file("goal.yaml")?;
//! let history = vec![ConversationTurn::new("user", "I want to fly to Paris")];
//!
//! let outcome = validator.validate(&goal, &history, "next Tuesday").await?;
//! println!("valid: {}", outcome.validation_result);
//! ```

use thiserror::Error;

use promptcheck_core::MalformedResponse;

pub mod config;
pub mod dispatcher;
pub mod providers;
pub mod tools;
pub mod validator;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, LlmSettings, ProviderKind};
pub use dispatcher::PromptDispatcher;
pub use providers::{LlmProvider, Provider, ProviderError};
pub use tools::{ToolArgs, ToolError, ToolHandler, ToolOutput, ToolRegistry};
pub use validator::PromptValidator;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("LLM provider not configured: {0}")]
    Configuration(#[from] ConfigError),

    #[error("LLM call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(#[from] MalformedResponse),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl RuntimeError {
    /// Whether the failure happened before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RuntimeError::Configuration(_))
    }

    /// Whether the model answered but no JSON object could be recovered.
    pub fn is_malformed(&self) -> bool {
        matches!(self, RuntimeError::MalformedResponse(_))
    }
}
