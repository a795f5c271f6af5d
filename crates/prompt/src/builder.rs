//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use localrag_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system instructions and the human template are rendered with
/// the same variables. HTML escaping is disabled since the output is plain
/// text for the model.
///
/// # Example
/// ```no_run
/// use localrag_prompt::{build_prompt, builtin_prompt, RAG_ANSWER_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(RAG_ANSWER_PROMPT_ID).unwrap();
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What are cats?".to_string());
/// vars.insert("context".to_string(), "Cats are mammals.".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;
    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: system.map(str::to_string),
            template: "Question: {{question}}\n\nContext:\n{{context}}".to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars);
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "a < b && \"c\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "a < b && \"c\"");
    }

    #[test]
    fn test_build_prompt_with_system() {
        let def = create_test_definition(Some("Be brief."));
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What are cats?".to_string());
        vars.insert("context".to_string(), "Cats are mammals.".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.system.as_deref(), Some("Be brief."));
        assert_eq!(
            built.user,
            "Question: What are cats?\n\nContext:\nCats are mammals."
        );
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_without_system() {
        let def = create_test_definition(None);
        let built = build_prompt(&def, HashMap::new()).unwrap();
        assert!(built.system.is_none());
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        let result = render_template("Question: {{missing}}", &vars);
        // Handlebars renders missing variables as empty string
        assert_eq!(result.unwrap(), "Question: ");
    }
}
