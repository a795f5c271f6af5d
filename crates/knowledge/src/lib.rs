//! Knowledge base for localrag.
//!
//! Ingests local PDFs and text files into a SQLite vector store, retrieves
//! relevant chunks for a question, falls back to web search when nothing
//! local matches, and asks the model to answer from that context.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod progress;
pub mod rag;
pub mod retrieval;
pub mod types;
pub mod vector_index;
pub mod web;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::ingest;
pub use loader::import_files;
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::{Answer, ChatSession, ContextSource, RagPipeline, Role, Turn};
pub use retrieval::retrieve;
pub use types::{
    ChunkMetadata, Citation, CitationKind, DocumentChunk, IndexStatus, IngestOptions,
    IngestStats, RetrievalConfig, ScoredChunk, SourceKind, WebHit,
};
pub use web::{create_search, search_or_empty, WebSearch};

use index::{index_path, SqliteIndex};
use localrag_core::AppResult;
use std::path::Path;
use vector_index::VectorIndex;

/// Describe the store for a collection without creating it.
pub fn status(persist_dir: &Path, collection: &str) -> AppResult<IndexStatus> {
    let path = index_path(persist_dir);

    let Some(index) = SqliteIndex::open_existing(&path)? else {
        return Ok(IndexStatus {
            index_path: path,
            exists: false,
            collection: collection.to_string(),
            chunks: 0,
            sources: 0,
            embedding_model: None,
            size_bytes: 0,
        });
    };

    let stats = index.stats(collection)?;
    let info = index.collection_info(collection)?;
    let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    Ok(IndexStatus {
        index_path: path,
        exists: true,
        collection: collection.to_string(),
        chunks: stats.chunks,
        sources: stats.sources,
        embedding_model: info.map(|i| format!("{}/{}", i.embedding_provider, i.embedding_model)),
        size_bytes,
    })
}
