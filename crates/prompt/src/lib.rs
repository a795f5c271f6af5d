//! Prompt system for localrag.
//!
//! This crate provides structured prompt management with:
//! - A built-in answer prompt (system instructions + human template)
//! - Optional YAML overrides in `.localrag/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, RAG_ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
