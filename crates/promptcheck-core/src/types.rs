//! Core types for prompt dispatch and validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A JSON object recovered from a model reply.
///
/// Only ever produced from text that parsed as JSON with an object at the
/// top level.
pub type ParsedResponse = Map<String, JsonValue>;

/// A prompt plus the context instructions that frame it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptRequest {
    /// The user-facing prompt
    pub prompt: String,

    /// System/context instructions sent ahead of the prompt
    pub context_instructions: String,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>, context_instructions: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context_instructions: context_instructions.into(),
        }
    }
}

/// One turn of conversation history.
///
/// Opaque to this crate: turns are serialized verbatim into prompt context
/// and never interpreted. The usual shape is `{"role": ..., "content": ...}`
/// but any JSON value is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ConversationTurn(pub JsonValue);

impl ConversationTurn {
    /// Create a `{"role", "content"}` turn.
    pub fn new(role: impl Into<String>, content: impl Into<JsonValue>) -> Self {
        Self(serde_json::json!({
            "role": role.into(),
            "content": content.into(),
        }))
    }

    /// The `role` field, if present and a string.
    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(JsonValue::as_str)
    }

    /// The `content` field, if present.
    pub fn content(&self) -> Option<&JsonValue> {
        self.0.get("content")
    }
}

impl From<JsonValue> for ConversationTurn {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// Typed result of asking the model whether a prompt makes sense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Whether the prompt sensibly advances the goal
    pub validation_result: bool,

    /// Empty when valid; otherwise expected to carry `next` and `response`
    #[serde(default)]
    pub validation_failed_reason: Map<String, JsonValue>,
}

impl ValidationOutcome {
    /// Map a parsed model reply into an outcome.
    ///
    /// Missing or mistyped keys fall back to `false` and `{}`. Any other keys
    /// inside `validationFailedReason` are passed through untouched.
    pub fn from_response(response: &ParsedResponse) -> Self {
        let validation_result = response
            .get("validationResult")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);

        let validation_failed_reason = response
            .get("validationFailedReason")
            .and_then(JsonValue::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            validation_result,
            validation_failed_reason,
        }
    }

    /// The `next` step suggested on failure (normally `"question"`).
    pub fn next_step(&self) -> Option<&str> {
        self.validation_failed_reason
            .get("next")
            .and_then(JsonValue::as_str)
    }

    /// The explanation shown to the user on failure.
    pub fn response_text(&self) -> Option<&str> {
        self.validation_failed_reason
            .get("response")
            .and_then(JsonValue::as_str)
    }
}
