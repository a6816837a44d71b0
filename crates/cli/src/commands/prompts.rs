//! Prompts command handler.

use super::print_json;
use clap::Args;
use scimentor_core::{config::AppConfig, AppResult};
use scimentor_prompt::{list_prompts, PromptSource};

/// List prompt templates and where they come from
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let prompts = list_prompts(&config.workspace)?;

        if self.json {
            return print_json(&serde_json::to_value(&prompts)?);
        }

        for prompt in prompts {
            let source = match prompt.source {
                PromptSource::Builtin => "built-in",
                PromptSource::Workspace => "workspace",
            };
            println!("{:<24} {}", prompt.id, source);
        }

        Ok(())
    }
}
