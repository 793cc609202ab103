//! Scripted provider for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};

/// Returns canned replies in order and records every message list it saw.
pub(crate) struct ScriptedProvider {
    config: CompletionConfig,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        Self {
            config: CompletionConfig::new("scripted"),
            replies: Mutex::new(replies.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(reply: &str) -> Self {
        Self::new([Ok(reply.to_string())])
    }

    pub(crate) fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.seen.lock().unwrap().push(messages);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))?;

        Ok(CompletionResponse {
            content: reply,
            model: config.model.clone(),
            stop_reason: Some("stop".to_string()),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn config(&self) -> &CompletionConfig {
        &self.config
    }
}
