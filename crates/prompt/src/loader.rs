//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::PromptDefinition;
use localrag_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the answer prompt used by the RAG pipeline.
pub const RAG_ANSWER_PROMPT_ID: &str = "rag.answer";

const RAG_ANSWER_SYSTEM: &str = "You are an assistant that answers using the provided context. \
Answer briefly and to the point. \
If the local documents do not contain the answer, use the web context.";

const RAG_ANSWER_TEMPLATE: &str = "Question: {{question}}\n\nContext:\n{{context}}";

/// Return a built-in prompt definition by ID.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        RAG_ANSWER_PROMPT_ID => Some(PromptDefinition {
            id: RAG_ANSWER_PROMPT_ID.to_string(),
            title: "Answer a question from retrieved context".to_string(),
            api_version: "1.0".to_string(),
            created_by: "localrag".to_string(),
            system: Some(RAG_ANSWER_SYSTEM.to_string()),
            template: RAG_ANSWER_TEMPLATE.to_string(),
        }),
        _ => None,
    }
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in the workspace's `.localrag/prompts/`
/// directory takes precedence over the built-in definition.
///
/// # Example
/// ```no_run
/// use localrag_prompt::{load_prompt, RAG_ANSWER_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), RAG_ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".localrag/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("No prompt override at {:?}, using built-in", prompt_file);
        return builtin_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

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

    if def.template.is_empty() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".localrag/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtin_answer_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), RAG_ANSWER_PROMPT_ID).unwrap();

        assert_eq!(prompt.id, RAG_ANSWER_PROMPT_ID);
        assert!(prompt.template.contains("{{question}}"));
        assert!(prompt.template.contains("{{context}}"));
        assert!(prompt.system.is_some());
    }

    #[test]
    fn test_workspace_override() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            RAG_ANSWER_PROMPT_ID,
            r#"
id: rag.answer
title: "Custom"
apiVersion: "1.0"
template: "Q: {{question}} C: {{context}}"
"#,
        );

        let prompt = load_prompt(temp_dir.path(), RAG_ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Custom");
        assert!(prompt.system.is_none());
    }

    #[test]
    fn test_load_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");

        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_invalid_api_version() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "versioned",
            r#"
id: versioned
title: "Bad version"
apiVersion: "1"
template: "{{question}}"
"#,
        );

        assert!(load_prompt(temp_dir.path(), "versioned").is_err());
    }
}
