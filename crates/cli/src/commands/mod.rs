//! Command handlers for the SciMentor CLI.

pub mod ask;
pub mod check;
pub mod prompts;

pub use ask::AskCommand;
pub use check::CheckCommand;
pub use prompts::PromptsCommand;

use scimentor_core::{AppError, AppResult};
use std::path::PathBuf;

/// Shown when a question is outside the domain.
pub const REFUSAL_MESSAGE: &str = "Your question is not related to science education or \
SEAMEO QIS topics. Please ask a relevant question.";

/// Question text from the positional argument or a file.
pub(crate) fn read_question(inline: Option<&str>, file: Option<&PathBuf>) -> AppResult<String> {
    if let Some(text) = inline {
        return Ok(text.to_string());
    }

    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read question file {:?}: {}", path, e))
        }),
        None => Err(AppError::Config("No question provided".to_string())),
    }
}

/// Pretty-print a JSON value to stdout.
pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
