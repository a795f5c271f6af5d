//! Vector index abstraction for knowledge chunks.
//!
//! Defines a trait for provider-agnostic vector storage and retrieval.

use crate::types::{DocumentChunk, ScoredChunk};
use chrono::{DateTime, Utc};
use localrag_core::AppResult;
use serde::Serialize;

/// Which embedding model built a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub updated_at: DateTime<Utc>,
}

impl CollectionInfo {
    /// Whether vectors from the given provider/model are comparable with this collection.
    pub fn matches(&self, provider: &str, model: &str, dimensions: usize) -> bool {
        self.embedding_provider == provider
            && self.embedding_model == model
            && self.dimensions == dimensions
    }
}

/// Chunk and source counts for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub chunks: u64,
    pub sources: u64,
}

/// Trait for vector index backends.
///
/// All operations are scoped to a named collection.
pub trait VectorIndex: Send {
    /// Append chunks and write the collection record atomically.
    ///
    /// Returns the number of chunks written.
    fn insert_chunks(&mut self, info: &CollectionInfo, chunks: &[DocumentChunk])
        -> AppResult<usize>;

    /// Replace every chunk of the collection in a single transaction.
    ///
    /// On failure the previous contents are left untouched.
    fn replace_chunks(&mut self, info: &CollectionInfo, chunks: &[DocumentChunk])
        -> AppResult<usize>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score.
    fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<ScoredChunk>>;

    /// The embedding model recorded for a collection, if any.
    fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>>;

    fn stats(&self, collection: &str) -> AppResult<CollectionStats>;
}
