//! End-to-end routing scenarios with a scripted model and recording pipelines.

use crate::classifier::SemanticClassifier;
use crate::inject::ORGANIZATION_GUIDANCE;
use crate::outcome::{PipelineChoice, SubDomain, ValidationOutcome, Via};
use crate::patterns::PatternMatcher;
use crate::pipeline::Pipeline;
use crate::question::Question;
use crate::router::{RouteOutcome, Router};
use crate::validator::ScopeValidator;
use scimentor_core::{AppConfig, AppError, AppResult};
use scimentor_llm::ScriptedClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    /// Pipeline double that records every call.
    struct RecordingPipeline {
        name: &'static str,
        fail_with: Option<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingPipeline {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(name: &'static str, message: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail_with: Some(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, question: &str, language: &str) -> AppResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((question.to_string(), language.to_string()));

            match self.fail_with {
                Some(ref message) => Err(AppError::Pipeline(message.clone())),
                None => Ok(format!("{} answer", self.name)),
            }
        }
    }

    struct Harness {
        client: Arc<ScriptedClient>,
        general: Arc<RecordingPipeline>,
        organization: Arc<RecordingPipeline>,
        router: Router,
    }

    fn validator(client: Arc<ScriptedClient>) -> ScopeValidator {
        let classifier =
            SemanticClassifier::with_builtin_prompt(client, "test-model", Duration::from_secs(5))
                .unwrap();
        ScopeValidator::new(
            classifier,
            PatternMatcher::scope().unwrap(),
            PatternMatcher::organization().unwrap(),
        )
    }

    fn harness(client: ScriptedClient) -> Harness {
        harness_with(
            client,
            RecordingPipeline::new("general"),
            RecordingPipeline::new("organization"),
        )
    }

    fn harness_with(
        client: ScriptedClient,
        general: Arc<RecordingPipeline>,
        organization: Arc<RecordingPipeline>,
    ) -> Harness {
        let client = Arc::new(client);
        let router = Router::new(
            validator(client.clone()),
            general.clone(),
            organization.clone(),
            "english",
        );
        Harness {
            client,
            general,
            organization,
            router,
        }
    }

    #[tokio::test]
    async fn test_acronym_question_falls_back_to_organization_pipeline() {
        let h = harness(ScriptedClient::new().reply("NOT_QIS"));

        let result = h
            .router
            .validate_and_route("What is SEAQIS?", "english")
            .await
            .unwrap();

        assert_eq!(
            result,
            RouteOutcome::Answered {
                text: "organization answer".to_string(),
                pipeline: PipelineChoice::Organization,
                outcome: ValidationOutcome::InScope {
                    sub_domain: SubDomain::Organization,
                    via: Via::Pattern,
                },
            }
        );
        assert_eq!(
            h.organization.calls(),
            vec![(
                format!("{}What is SEAQIS?", ORGANIZATION_GUIDANCE),
                "english".to_string()
            )]
        );
        assert!(h.general.calls().is_empty());
        assert_eq!(h.client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_question_is_refused() {
        let h = harness(ScriptedClient::new().reply("NOT_QIS"));

        let result = h
            .router
            .validate_and_route("How do I cook pasta?", "english")
            .await
            .unwrap();

        assert_eq!(result, RouteOutcome::OutOfScope);
        assert!(h.general.calls().is_empty());
        assert!(h.organization.calls().is_empty());
    }

    #[tokio::test]
    async fn test_semantic_yes_uses_general_pipeline_unmodified() {
        let h = harness(ScriptedClient::new().reply("QIS_CONTEXT"));
        let question = "How can I improve STEM education in my classroom?";

        let result = h
            .router
            .validate_and_route(question, "indonesian")
            .await
            .unwrap();

        match result {
            RouteOutcome::Answered {
                text,
                pipeline,
                outcome,
            } => {
                assert_eq!(text, "general answer");
                assert_eq!(pipeline, PipelineChoice::General);
                assert_eq!(outcome.via(), Some(Via::Semantic));
                assert_eq!(outcome.sub_domain(), Some(SubDomain::General));
            }
            RouteOutcome::OutOfScope => panic!("expected an answer"),
        }
        assert_eq!(
            h.general.calls(),
            vec![(question.to_string(), "indonesian".to_string())]
        );
        assert!(h.organization.calls().is_empty());
    }

    #[tokio::test]
    async fn test_acronym_in_any_case_is_in_scope() {
        for question in [
            "what is seaqis",
            "Tell me about SEAQIS programs",
            "Does SeAmEo offer teacher training?",
            "Apa itu QIS?",
            "Who runs Sea-Qis?",
            "Info tentang SEAMEOQIS dong",
            "Kapan kegiatan SEAQISnya?",
            "seaqis2024 workshop",
            "Apa programnya SEAQISnya?",
        ] {
            for client in [
                ScriptedClient::new().reply("NOT_QIS"),
                ScriptedClient::new().fail("network down"),
                ScriptedClient::new().reply("I cannot tell."),
            ] {
                let outcome = validator(Arc::new(client))
                    .validate(&Question::new(question))
                    .await;
                assert!(outcome.is_in_scope(), "{question:?} should be in scope");
                assert_eq!(outcome.sub_domain(), Some(SubDomain::Organization));
            }
        }
    }

    #[tokio::test]
    async fn test_classifier_error_yields_pattern_verdict() {
        let cases = [
            ("What are the best practices for teaching science in high school?", true),
            ("Dimana lokasi SEAMEO QIS?", true),
            ("What is the weather like today?", false),
            ("Tell me about the latest smartphone", false),
        ];

        let matcher = PatternMatcher::scope().unwrap();
        for (question, expected) in cases {
            let client = Arc::new(ScriptedClient::new().fail("connection reset"));
            let question = Question::new(question);
            let outcome = validator(client.clone()).validate(&question).await;

            assert_eq!(outcome.is_in_scope(), expected);
            assert_eq!(outcome.is_in_scope(), matcher.matches(question.normalized()));
            assert_eq!(client.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_validate_is_idempotent() {
        let validator = validator(Arc::new(ScriptedClient::new().with_fallback("NOT_QIS")));

        for text in ["Apa program SEAQIS?", "How do I cook pasta?", "What is the focus of QIS?"] {
            let question = Question::new(text);
            let first = validator.validate(&question).await;
            let second = validator.validate(&question).await;
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn test_organization_implies_in_scope() {
        let validator = validator(Arc::new(ScriptedClient::new().with_fallback("QIS_CONTEXT")));

        for text in ["", "What is SEAQIS?", "Why is the sky blue?", "qis"] {
            let outcome = validator.validate(&Question::new(text)).await;
            if outcome.sub_domain() == Some(SubDomain::Organization) {
                assert!(outcome.is_in_scope());
            }
            if !outcome.is_in_scope() {
                assert_eq!(outcome.pipeline_choice(), None);
            }
        }
    }

    #[tokio::test]
    async fn test_pipeline_error_surfaces_unchanged() {
        let h = harness_with(
            ScriptedClient::new().reply("QIS_CONTEXT"),
            RecordingPipeline::failing("general", "search backend offline"),
            RecordingPipeline::new("organization"),
        );

        let err = h
            .router
            .validate_and_route("Why do objects float?", "english")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Pipeline(ref m) if m == "search backend offline"));
        assert_eq!(h.general.calls().len(), 1);
        assert!(h.organization.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_language_uses_default() {
        let h = harness(ScriptedClient::new().reply("QIS_CONTEXT"));

        h.router
            .validate_and_route("Why do objects float?", "  ")
            .await
            .unwrap();

        assert_eq!(h.general.calls()[0].1, "english");
    }

    #[tokio::test]
    async fn test_blank_question_is_refused_without_model_call() {
        let h = harness(ScriptedClient::new().reply("QIS_CONTEXT"));

        let result = h.router.validate_and_route("", "english").await.unwrap();

        assert_eq!(result, RouteOutcome::OutOfScope);
        assert_eq!(h.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_share_outcomes() {
        let h = harness(ScriptedClient::new().with_fallback("NOT_QIS"));
        let router = Arc::new(h.router);

        let (first, second) = tokio::join!(
            router.validate_and_route("What is SEAQIS?", "english"),
            router.validate_and_route("How do I cook pasta?", "english"),
        );

        assert!(matches!(
            first.unwrap(),
            RouteOutcome::Answered {
                pipeline: PipelineChoice::Organization,
                ..
            }
        ));
        assert_eq!(second.unwrap(), RouteOutcome::OutOfScope);
        assert_eq!(h.organization.calls().len(), 1);
        assert!(h.general.calls().is_empty());
    }

    #[tokio::test]
    async fn test_router_from_config_with_extra_patterns() {
        let workspace = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.workspace = workspace.path().to_path_buf();
        config.routing.extra_patterns = vec![r"\bphysics\s+lab\b".to_string()];

        let client = Arc::new(
            ScriptedClient::new()
                .reply("NOT_QIS")
                .reply("research notes")
                .reply("## Lab safety"),
        );
        let router = Router::with_client(&config, client.clone()).unwrap();

        let result = router
            .validate_and_route("How should I set up a physics lab?", "")
            .await
            .unwrap();

        match result {
            RouteOutcome::Answered { text, pipeline, .. } => {
                assert_eq!(text, "## Lab safety");
                assert_eq!(pipeline, PipelineChoice::General);
            }
            RouteOutcome::OutOfScope => panic!("extra pattern should accept the question"),
        }
        assert_eq!(client.call_count(), 3);
        assert!(client.prompts()[2].contains("language: english"));
    }

    #[tokio::test]
    async fn test_router_from_config_rejects_bad_pattern() {
        let workspace = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.workspace = workspace.path().to_path_buf();
        config.routing.extra_organization_patterns = vec!["(unclosed".to_string()];

        let result = Router::with_client(&config, Arc::new(ScriptedClient::new()));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
