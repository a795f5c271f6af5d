//! Command handlers for the localrag CLI.
//!
//! This module organizes all CLI commands into separate submodules, plus the
//! wiring and rendering they share.

pub mod add;
pub mod ask;
pub mod chat;
pub mod ingest;
pub mod status;

// Re-export command types for convenience
pub use add::AddCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use status::StatusCommand;

use localrag_core::{config::AppConfig, AppResult};
use localrag_knowledge::{create_provider, create_search, Citation, RagPipeline, SourceKind};
use localrag_llm::create_client;
use localrag_prompt::{load_prompt, RAG_ANSWER_PROMPT_ID};

/// Build the answer pipeline from configuration.
pub fn build_pipeline(config: &AppConfig) -> AppResult<RagPipeline> {
    let llm = create_client(&config.llm)?;
    let embedder = create_provider(&config.embedding)?;
    let web = create_search(&config.search)?;
    let prompt = load_prompt(&config.workspace, RAG_ANSWER_PROMPT_ID)?;

    tracing::debug!(
        llm = llm.provider_name(),
        embedder = embedder.model_name(),
        web = web.provider_name(),
        "Built answer pipeline"
    );

    Ok(RagPipeline::new(llm, embedder, web, prompt)
        .with_llm_settings(&config.llm)
        .with_collection(config.collection.clone()))
}

/// Lines describing where an answer came from; empty when no context was used.
pub fn render_sources(kind: SourceKind, citations: &[Citation]) -> Vec<String> {
    let heading = match kind {
        SourceKind::Local => "Local documents",
        SourceKind::Web => "Web",
        SourceKind::Empty => return Vec::new(),
    };

    let mut lines = vec![format!("Sources • {}", heading)];
    lines.extend(citations.iter().map(|c| format!("  - {}", c.label)));
    lines
}

/// Print an answer followed by its sources.
pub fn print_answer(text: &str, kind: Option<SourceKind>, citations: &[Citation]) {
    println!("{}", text.trim_end());
    if let Some(kind) = kind {
        let sources = render_sources(kind, citations);
        if !sources.is_empty() {
            println!();
            for line in sources {
                println!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_local_sources() {
        let citations = vec![Citation {
            kind: localrag_knowledge::CitationKind::Local,
            label: "cats.txt".to_string(),
        }];
        let lines = render_sources(SourceKind::Local, &citations);
        assert_eq!(lines, vec!["Sources • Local documents", "  - cats.txt"]);
    }

    #[test]
    fn test_render_web_sources() {
        let lines = render_sources(SourceKind::Web, &[Citation::web("http://u")]);
        assert_eq!(lines[0], "Sources • Web");
        assert_eq!(lines[1], "  - http://u");
    }

    #[test]
    fn test_render_no_sources() {
        assert!(render_sources(SourceKind::Empty, &[]).is_empty());
    }

    #[test]
    fn test_build_pipeline_offline() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::for_workspace(temp.path());
        config.embedding.provider = "trigram".to_string();
        config.search.provider = "none".to_string();

        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(pipeline.model(), "gemma3n:e2b");
        assert_eq!(pipeline.embedder().model_name(), "trigram-v1");
    }
}
