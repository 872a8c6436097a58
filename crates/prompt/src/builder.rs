//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use docuchat_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system and user templates are rendered with the same
/// variables. Variable values are inserted verbatim: no HTML escaping,
/// and braces inside document text are never re-interpreted.
///
/// # Example
/// ```
/// use docuchat_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "Cats sleep a lot.".to_string());
/// vars.insert("question".to_string(), "Do cats sleep?".to_string());
///
/// let built = build_prompt(&PromptDefinition::answer(), &vars).unwrap();
/// assert_eq!(built.user, "Context:\nCats sleep a lot.\n\nQuestion: Do cats sleep?");
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = match definition.system {
        Some(ref template) => Some(render_template(template, variables)?),
        None => None,
    };
    let user = render_template(&definition.template, variables)?;

    Ok(BuiltPrompt { system, user })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
