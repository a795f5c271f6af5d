//! Text chunking with configurable size and overlap.

use crate::loader::LoadedDocument;
use crate::types::ChunkMetadata;
use localrag_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use text_splitter::{ChunkConfig, TextSplitter};

/// A chunk before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub content_hash: String,
}

/// Split documents into overlapping chunks.
///
/// Sizes are measured in characters. Splitting prefers semantic boundaries
/// (paragraphs, sentences, words) and only cuts inside a word when needed.
pub fn chunk_documents(
    documents: &[LoadedDocument],
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<ChunkCandidate>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| {
            AppError::Config(format!(
                "Invalid chunking (size {}, overlap {}): {}",
                chunk_size, overlap, e
            ))
        })?;
    let splitter = TextSplitter::new(config);

    let mut chunks = Vec::new();
    for document in documents {
        for text in splitter.chunks(&document.text) {
            if text.trim().is_empty() {
                continue;
            }
            chunks.push(ChunkCandidate {
                text: text.to_string(),
                metadata: document.metadata.clone(),
                content_hash: content_hash(text),
            });
        }
    }

    tracing::debug!(
        "Chunked {} documents into {} chunks (size: {}, overlap: {})",
        documents.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}

/// Hex SHA-256 of a chunk's text.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
