//! Check command handler.
//!
//! Runs only the scope validator and reports its decision.

use super::{print_json, read_question};
use clap::Args;
use scimentor_core::{config::AppConfig, AppResult};
use scimentor_router::{Question, Router, ValidationOutcome};
use std::path::PathBuf;

/// Only check whether a question is in scope
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// The question to check
    #[arg(conflicts_with = "file")]
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Check command options: {:?}", self);

        let question = Question::new(read_question(self.question.as_deref(), self.file.as_ref())?);
        let router = Router::from_config(config)?;
        let outcome = router.validator().validate(&question).await;

        if self.json {
            return print_json(&serde_json::json!({
                "question": question.raw(),
                "validation": outcome,
            }));
        }

        println!("{}", describe(&outcome));
        Ok(())
    }
}

fn describe(outcome: &ValidationOutcome) -> String {
    match outcome {
        ValidationOutcome::InScope { sub_domain, via } => format!(
            "in scope (sub-domain: {:?}, decided by: {:?})",
            sub_domain, via
        )
        .to_lowercase(),
        ValidationOutcome::OutOfScope => "out of scope".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scimentor_router::{SubDomain, Via};

    #[test]
    fn test_describe() {
        let outcome = ValidationOutcome::InScope {
            sub_domain: SubDomain::Organization,
            via: Via::Semantic,
        };
        assert_eq!(
            describe(&outcome),
            "in scope (sub-domain: organization, decided by: semantic)"
        );
        assert_eq!(describe(&ValidationOutcome::OutOfScope), "out of scope");
    }
}
