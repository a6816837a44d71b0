//! Prompt rendering.

use crate::types::PromptDefinition;
use handlebars::Handlebars;
use scimentor_core::{AppError, AppResult};
use std::collections::HashMap;

/// Render a prompt definition with the given variables.
///
/// Rendering is strict: a variable referenced by the template but absent
/// from `variables` is an error rather than an empty string. HTML escaping
/// is disabled since the output is plain text for a model.
///
/// # Example
/// ```
/// use scimentor_prompt::{builtin_prompt, render_prompt};
/// use std::collections::HashMap;
///
/// let def = builtin_prompt("scope.classify").unwrap();
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is SEAQIS?".to_string());
///
/// let text = render_prompt(&def, &vars).unwrap();
/// assert!(text.contains("What is SEAQIS?"));
/// ```
pub fn render_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    tracing::trace!("Rendering prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(&definition.id, &definition.template)
        .map_err(|e| {
            AppError::Prompt(format!(
                "Failed to register template '{}': {}",
                definition.id, e
            ))
        })?;

    handlebars.render(&definition.id, variables).map_err(|e| {
        AppError::Prompt(format!("Failed to render template '{}': {}", definition.id, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(template: &str) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            template: template.to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Why is the sky blue?".to_string());

        let rendered = render_prompt(&definition("Question: {{question}}"), &vars).unwrap();
        assert_eq!(rendered, "Question: Why is the sky blue?");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Is 3 < 5 & 5 > 3?".to_string());

        let rendered = render_prompt(&definition("{{question}}"), &vars).unwrap();
        assert_eq!(rendered, "Is 3 < 5 & 5 > 3?");
    }

    #[test]
    fn test_render_missing_variable_fails() {
        let vars = HashMap::new();
        let result = render_prompt(&definition("Question: {{question}}"), &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_render_malformed_template_fails() {
        let vars = HashMap::new();
        let result = render_prompt(&definition("Question: {{#if}}"), &vars);
        assert!(result.is_err());
    }
}
