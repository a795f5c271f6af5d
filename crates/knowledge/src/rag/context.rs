//! Context selection result and its rendering.

use crate::rag::types::NO_CONTEXT_PLACEHOLDER;
use crate::types::{Citation, ScoredChunk, SourceKind, WebHit};
use std::collections::HashSet;

/// The context chosen for a question.
#[derive(Debug, Clone)]
pub enum ContextSource {
    /// At least one local chunk passed retrieval
    Local(Vec<ScoredChunk>),
    /// No local chunks; the web fallback returned hits
    Web(Vec<WebHit>),
    Empty,
}

impl ContextSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Local(_) => SourceKind::Local,
            Self::Web(_) => SourceKind::Web,
            Self::Empty => SourceKind::Empty,
        }
    }

    /// Text inserted into the prompt.
    pub fn context_text(&self) -> String {
        match self {
            Self::Local(chunks) => chunks
                .iter()
                .map(|scored| scored.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Web(hits) => hits
                .iter()
                .enumerate()
                .map(|(i, hit)| format!("[{}] {}\n{}\nURL: {}", i + 1, hit.title, hit.snippet, hit.url))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Empty => NO_CONTEXT_PLACEHOLDER.to_string(),
        }
    }

    /// Citations for the context, local ones deduplicated by label in order.
    pub fn citations(&self) -> Vec<Citation> {
        match self {
            Self::Local(chunks) => {
                let mut seen = HashSet::new();
                chunks
                    .iter()
                    .map(|scored| Citation::local(&scored.chunk.metadata))
                    .filter(|citation| seen.insert(citation.label.clone()))
                    .collect()
            }
            Self::Web(hits) => hits.iter().map(|hit| Citation::web(&hit.url)).collect(),
            Self::Empty => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkMetadata, CitationKind, DocumentChunk};
    use chrono::Utc;
    use std::path::Path;

    fn scored(text: &str, source: &str, page: Option<u32>) -> ScoredChunk {
        let metadata = match page {
            Some(page) => ChunkMetadata::for_page(Path::new(source), page),
            None => ChunkMetadata::for_file(Path::new(source)),
        };
        ScoredChunk {
            chunk: DocumentChunk {
                id: text.to_string(),
                collection: "local_docs".to_string(),
                text: text.to_string(),
                metadata,
                content_hash: String::new(),
                embedding: Vec::new(),
                created_at: Utc::now(),
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_local_context_and_dedup() {
        let source = ContextSource::Local(vec![
            scored("First.", "/d/pdf/guide.pdf", Some(1)),
            scored("Second.", "/d/pdf/guide.pdf", Some(1)),
            scored("Third.", "/d/txt/cats.txt", None),
            scored("Fourth.", "/d/pdf/guide.pdf", Some(2)),
        ]);

        assert_eq!(source.kind(), SourceKind::Local);
        assert_eq!(
            source.context_text(),
            "First.\n\nSecond.\n\nThird.\n\nFourth."
        );

        let labels: Vec<String> = source.citations().into_iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec!["guide.pdf (page 1)", "cats.txt", "guide.pdf (page 2)"]
        );
    }

    #[test]
    fn test_web_context() {
        let source = ContextSource::Web(vec![
            WebHit::new("T", "http://u", "body"),
            WebHit::new("T2", "http://v", "more"),
        ]);

        assert_eq!(
            source.context_text(),
            "[1] T\nbody\nURL: http://u\n\n[2] T2\nmore\nURL: http://v"
        );

        let citations = source.citations();
        assert_eq!(citations.len(), 2);
        assert!(citations.iter().all(|c| c.kind == CitationKind::Web));
        assert_eq!(citations[0].label, "http://u");
    }

    #[test]
    fn test_empty_context() {
        let source = ContextSource::Empty;
        assert_eq!(source.kind(), SourceKind::Empty);
        assert_eq!(source.context_text(), NO_CONTEXT_PLACEHOLDER);
        assert!(source.citations().is_empty());
    }
}
