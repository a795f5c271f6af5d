//! In-memory conversation state for the interactive shell.

use crate::rag::pipeline::RagPipeline;
use crate::types::{Citation, RetrievalConfig, SourceKind};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub sources: Vec<Citation>,
    pub source_kind: Option<SourceKind>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            source_kind: None,
        }
    }

    /// An assistant turn recording a failed answer.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            role: Role::Assistant,
            content: format!("Error: {}", message),
            sources: Vec::new(),
            source_kind: None,
        }
    }
}

/// Conversation history. Never persisted.
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask a question and record both turns.
    ///
    /// Failures are recorded as an `Error: ...` assistant turn rather than
    /// returned, so the session always continues.
    pub async fn ask(
        &mut self,
        pipeline: &RagPipeline,
        question: &str,
        persist_dir: &Path,
        config: &RetrievalConfig,
    ) -> &Turn {
        self.history.push(Turn::user(question));

        let turn = match pipeline.answer(question, persist_dir, config).await {
            Ok(answer) => Turn {
                role: Role::Assistant,
                content: answer.text,
                sources: answer.citations,
                source_kind: Some(answer.source_kind),
            },
            Err(e) => {
                tracing::warn!("Answer failed: {}", e);
                Turn::error(e)
            }
        };

        self.history.push(turn);
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
