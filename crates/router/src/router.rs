//! Pipeline selection: the single entry point for the presentation layer.

use crate::classifier::{SemanticClassifier, CLASSIFY_PROMPT_ID};
use crate::inject::inject;
use crate::outcome::{PipelineChoice, ValidationOutcome};
use crate::patterns::PatternMatcher;
use crate::pipeline::{build_pipeline, Pipeline, PipelinePrompts};
use crate::question::Question;
use crate::validator::ScopeValidator;
use scimentor_core::{AppConfig, AppResult};
use scimentor_llm::{create_client, LlmClient};
use scimentor_prompt::load_prompt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// What the caller gets back: an answer or a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteOutcome {
    Answered {
        text: String,
        pipeline: PipelineChoice,
        outcome: ValidationOutcome,
    },
    OutOfScope,
}

/// Validates questions and hands in-scope ones to exactly one pipeline.
pub struct Router {
    validator: ScopeValidator,
    general: Arc<dyn Pipeline>,
    organization: Arc<dyn Pipeline>,
    default_language: String,
}

impl Router {
    pub fn new(
        validator: ScopeValidator,
        general: Arc<dyn Pipeline>,
        organization: Arc<dyn Pipeline>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            general,
            organization,
            default_language: default_language.into(),
        }
    }

    /// Assemble a router from configuration: completion client, prompts,
    /// pattern rules and both profile pipelines.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let provider_config = config.get_provider_config(&config.provider);
        let client = create_client(
            &config.provider,
            provider_config.and_then(|pc| pc.endpoint()),
            config.resolve_api_key(&config.provider).as_deref(),
            provider_config
                .and_then(|pc| pc.timeout())
                .map(Duration::from_secs),
        )?;

        Self::with_client(config, client)
    }

    /// Assemble a router around an existing completion client.
    pub fn with_client(config: &AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        let routing = &config.routing;

        let classifier = SemanticClassifier::new(
            client.clone(),
            &config.model,
            load_prompt(&config.workspace, CLASSIFY_PROMPT_ID)?,
            Duration::from_secs(routing.classifier_timeout_secs),
        );
        let validator = ScopeValidator::new(
            classifier,
            PatternMatcher::scope()?.with_extra(&routing.extra_patterns)?,
            PatternMatcher::organization()?.with_extra(&routing.extra_organization_patterns)?,
        );

        let prompts = PipelinePrompts::load(&config.workspace)?;
        let general = build_pipeline(
            PipelineChoice::General,
            client.clone(),
            &config.model,
            prompts.clone(),
        );
        let organization =
            build_pipeline(PipelineChoice::Organization, client, &config.model, prompts);

        tracing::debug!(
            provider = %config.provider,
            model = %config.model,
            "Router assembled"
        );

        Ok(Self::new(
            validator,
            general,
            organization,
            &routing.default_language,
        ))
    }

    pub fn validator(&self) -> &ScopeValidator {
        &self.validator
    }

    /// Validate a question and, if it is in scope, answer it.
    ///
    /// A blank `language` selects the configured default. Pipeline errors
    /// are returned unchanged.
    pub async fn validate_and_route(
        &self,
        question: &str,
        language: &str,
    ) -> AppResult<RouteOutcome> {
        let question = Question::new(question);
        let outcome = self.validator.validate(&question).await;
        self.route(&question, outcome, language).await
    }

    /// Dispatch a validated question to the pipeline its outcome selects.
    pub async fn route(
        &self,
        question: &Question,
        outcome: ValidationOutcome,
        language: &str,
    ) -> AppResult<RouteOutcome> {
        let ValidationOutcome::InScope { sub_domain, .. } = outcome else {
            return Ok(RouteOutcome::OutOfScope);
        };

        let language = if language.trim().is_empty() {
            self.default_language.as_str()
        } else {
            language
        };

        let choice = PipelineChoice::from(sub_domain);
        let input = inject(question.raw(), sub_domain);

        let pipeline = self.pipeline_for(choice);
        tracing::info!(pipeline = pipeline.name(), %language, "Routing question");

        let text = pipeline.run(&input, language).await?;

        Ok(RouteOutcome::Answered {
            text,
            pipeline: choice,
            outcome,
        })
    }

    fn pipeline_for(&self, choice: PipelineChoice) -> &Arc<dyn Pipeline> {
        match choice {
            PipelineChoice::General => &self.general,
            PipelineChoice::Organization => &self.organization,
        }
    }
}
