//! Prompt system for SciMentor.
//!
//! - YAML prompt definitions, built in and overridable per workspace
//! - Strict Handlebars rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::render_prompt;
pub use loader::{builtin_prompt, list_prompts, load_prompt};
pub use types::{PromptDefinition, PromptSource, PromptSummary};
