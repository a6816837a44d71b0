//! Scripted completion client.
//!
//! Replays a queue of canned replies and records every prompt it receives.
//! Used for tests and offline runs; it never touches the network.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use scimentor_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Text(String),
    Failure(String),
}

/// Deterministic in-memory client.
///
/// Replies are consumed in order. Once the queue is empty the fallback reply
/// is returned, or an error if none was set.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    /// Queue a provider failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Failure(message.into()));
        self
    }

    /// Reply returned whenever the queue is empty.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Number of completion calls received.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|prompts| prompts.len()).unwrap_or(0)
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    fn next_reply(&self) -> Option<Reply> {
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            Some(Reply::Text(text)) => Ok(LlmResponse::text(text, &request.model)),
            Some(Reply::Failure(message)) => Err(AppError::Llm(message)),
            None => match self.fallback {
                Some(ref text) => Ok(LlmResponse::text(text.clone(), &request.model)),
                None => Err(AppError::Llm("Scripted client has no reply left".to_string())),
            },
        }
    }
}
