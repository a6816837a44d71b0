//! Semantic scope classification through a single completion call.

use crate::outcome::ClassificationResult;
use crate::question::Question;
use scimentor_core::AppResult;
use scimentor_llm::{LlmClient, LlmRequest};
use scimentor_prompt::{builtin_prompt, render_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Prompt ID of the classification template.
pub const CLASSIFY_PROMPT_ID: &str = "scope.classify";

/// Token the model returns for an in-scope question.
pub const IN_SCOPE_TOKEN: &str = "QIS_CONTEXT";

/// Token the model returns for an out-of-scope question.
pub const OUT_OF_SCOPE_TOKEN: &str = "NOT_QIS";

/// Room for a verbose reply that explains itself before giving the token.
const CLASSIFY_MAX_TOKENS: u32 = 256;

/// Decoded model verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeVerdict {
    InScope,
    NotInScope,
    Unrecognized,
}

impl ScopeVerdict {
    /// Decode a raw model reply.
    ///
    /// The reply is trimmed, whitespace-collapsed and upper-cased. The
    /// in-scope token is looked for first, so a verbose reply that also
    /// repeats the question still decodes. Anything without either token is
    /// `Unrecognized`, which callers treat as not in scope.
    pub fn decode(raw: &str) -> Self {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        if normalized.contains(IN_SCOPE_TOKEN) {
            ScopeVerdict::InScope
        } else if normalized.contains(OUT_OF_SCOPE_TOKEN) {
            ScopeVerdict::NotInScope
        } else {
            ScopeVerdict::Unrecognized
        }
    }
}

/// Asks the completion capability whether a question is in scope.
///
/// Never fails: provider errors, timeouts, prompt errors and unrecognised
/// replies all become `ClassificationResult::fallback_error()` and are
/// logged at `warn`.
pub struct SemanticClassifier {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    timeout: Duration,
}

impl SemanticClassifier {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            timeout,
        }
    }

    /// Classifier using the built-in `scope.classify` template.
    pub fn with_builtin_prompt(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let prompt = builtin_prompt(CLASSIFY_PROMPT_ID)?;
        Ok(Self::new(client, model, prompt, timeout))
    }

    /// Build the completion request for a question.
    pub fn build_request(&self, question: &Question) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.raw().to_string());

        let prompt = render_prompt(&self.prompt, &variables)?;

        Ok(LlmRequest::new(prompt, &self.model)
            .with_temperature(0.0)
            .with_max_tokens(CLASSIFY_MAX_TOKENS))
    }

    /// Classify a question with exactly one completion call.
    pub async fn classify(&self, question: &Question) -> ClassificationResult {
        let request = match self.build_request(question) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Classifier unavailable: prompt could not be built");
                return ClassificationResult::fallback_error();
            }
        };

        let reply = match tokio::time::timeout(self.timeout, self.client.complete(&request)).await
        {
            Ok(Ok(response)) => response.content,
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = self.client.provider_name(),
                    error = %e,
                    "Classifier unavailable: completion failed"
                );
                return ClassificationResult::fallback_error();
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.client.provider_name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Classifier unavailable: completion timed out"
                );
                return ClassificationResult::fallback_error();
            }
        };

        match ScopeVerdict::decode(&reply) {
            ScopeVerdict::InScope => ClassificationResult::llm(true),
            ScopeVerdict::NotInScope => ClassificationResult::llm(false),
            ScopeVerdict::Unrecognized => {
                tracing::warn!(reply = %reply.trim(), "Classifier unavailable: unrecognized reply");
                ClassificationResult::fallback_error()
            }
        }
    }
}
