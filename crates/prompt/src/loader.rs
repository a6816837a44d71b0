//! Prompt loading: built-in definitions with per-workspace overrides.

use crate::types::{PromptDefinition, PromptSource, PromptSummary};
use scimentor_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Built-in prompt definitions, embedded at compile time.
const BUILTIN_PROMPTS: [(&str, &str); 3] = [
    (
        "scope.classify",
        include_str!("../prompts/scope.classify.yml"),
    ),
    (
        "pipeline.research",
        include_str!("../prompts/pipeline.research.yml"),
    ),
    (
        "pipeline.answer",
        include_str!("../prompts/pipeline.answer.yml"),
    ),
];

/// Load a built-in prompt definition by ID.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown built-in prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

/// Load a prompt definition by ID.
///
/// `.scimentor/prompts/<id>.yml` in the workspace takes precedence over the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use scimentor_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "scope.classify")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("Using built-in prompt: {}", prompt_id);
        return builtin_prompt(prompt_id);
    }

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List every available prompt: built-ins, replaced or extended by workspace files.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<PromptSummary>> {
    let mut prompts: Vec<PromptSummary> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| PromptSummary {
            id: id.to_string(),
            source: PromptSource::Builtin,
        })
        .collect();

    let dir = prompts_dir(workspace_path);
    if !dir.exists() {
        return Ok(prompts);
    }

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        match prompts.iter_mut().find(|p| p.id == stem) {
            Some(existing) => existing.source = PromptSource::Workspace,
            None => prompts.push(PromptSummary {
                id: stem.to_string(),
                source: PromptSource::Workspace,
            }),
        }
    }

    prompts.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(prompts)
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".scimentor/prompts")
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
