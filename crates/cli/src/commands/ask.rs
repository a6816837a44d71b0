//! Ask command handler.
//!
//! Validates the question, routes it to the matching pipeline and prints the
//! answer, or the refusal when the question is out of scope.

use super::{print_json, read_question, REFUSAL_MESSAGE};
use clap::Args;
use scimentor_core::{config::AppConfig, AppResult};
use scimentor_router::{RouteOutcome, Router};
use std::path::PathBuf;

/// Ask a science education question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(conflicts_with = "file")]
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Answer language (default: routing.defaultLanguage from config)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let question = read_question(self.question.as_deref(), self.file.as_ref())?;
        let language = self
            .lang
            .clone()
            .unwrap_or_else(|| config.routing.default_language.clone());

        let router = Router::from_config(config)?;
        let result = router.validate_and_route(&question, &language).await?;

        if self.json {
            return print_json(&self.to_json(&question, &language, &result));
        }

        match result {
            RouteOutcome::Answered { text, .. } => println!("{}", text),
            RouteOutcome::OutOfScope => println!("{}", REFUSAL_MESSAGE),
        }

        Ok(())
    }

    fn to_json(
        &self,
        question: &str,
        language: &str,
        result: &RouteOutcome,
    ) -> serde_json::Value {
        match result {
            RouteOutcome::Answered {
                text,
                pipeline,
                outcome,
            } => serde_json::json!({
                "status": "answered",
                "question": question,
                "language": language,
                "pipeline": pipeline,
                "validation": outcome,
                "answer": text,
            }),
            RouteOutcome::OutOfScope => serde_json::json!({
                "status": "out_of_scope",
                "question": question,
                "message": REFUSAL_MESSAGE,
            }),
        }
    }
}
