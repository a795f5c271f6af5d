//! Local retrieval over the persisted vector store.

use crate::embeddings::EmbeddingProvider;
use crate::index::{index_path, SqliteIndex};
use crate::types::ScoredChunk;
use crate::vector_index::VectorIndex;
use localrag_core::{AppError, AppResult};
use std::path::Path;

/// Retrieve the `k` most similar chunks, then drop those below `threshold`.
///
/// A missing store or an empty collection yields no chunks without calling
/// the embedder. A collection built with another embedding model is an error.
pub async fn retrieve(
    persist_dir: &Path,
    collection: &str,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
    threshold: Option<f32>,
) -> AppResult<Vec<ScoredChunk>> {
    let Some(index) = SqliteIndex::open_existing(&index_path(persist_dir))? else {
        tracing::info!("No index at {:?}; local retrieval is empty", persist_dir);
        return Ok(Vec::new());
    };

    let Some(info) = index.collection_info(collection)? else {
        tracing::info!("Collection '{}' does not exist yet", collection);
        return Ok(Vec::new());
    };

    if index.stats(collection)?.chunks == 0 {
        return Ok(Vec::new());
    }

    if !info.matches(
        embedder.provider_name(),
        embedder.model_name(),
        embedder.dimensions(),
    ) {
        return Err(AppError::Knowledge(format!(
            "Collection '{}' was built with {}/{} ({} dims) but the active embedder is {}/{} ({} dims). Re-run ingestion with reset.",
            collection,
            info.embedding_provider,
            info.embedding_model,
            info.dimensions,
            embedder.provider_name(),
            embedder.model_name(),
            embedder.dimensions()
        )));
    }

    let query_embedding = embedder.embed(query).await?;
    let mut results = index.search(collection, &query_embedding, k)?;

    if let Some(top) = results.first() {
        tracing::debug!(
            "Top score {:.3} over {} candidates",
            top.score,
            results.len()
        );
    }

    if let Some(threshold) = threshold {
        results.retain(|scored| scored.score >= threshold);
    }

    tracing::info!(
        "Retrieved {} chunks (k={}, threshold={:?})",
        results.len(),
        k,
        threshold
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::ingest::ingest;
    use crate::progress::ProgressReporter;
    use crate::types::IngestOptions;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    /// Embedder that fails if it is ever called.
    #[derive(Debug)]
    struct UnreachableEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnreachableEmbedder {
        fn provider_name(&self) -> &str {
            "trigram"
        }

        fn model_name(&self) -> &str {
            "trigram-v1"
        }

        fn dimensions(&self) -> usize {
            64
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Llm("embedder should not be called".to_string()))
        }
    }

    async fn ingest_cats(root: &Path) {
        let dir = root.join("data/txt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cats.txt"), "Cats are mammals.").unwrap();
        fs::write(dir.join("rust.txt"), "Rust compiles to native code.").unwrap();

        let options = IngestOptions {
            data_dir: root.join("data"),
            persist_dir: root.join("index"),
            collection: "local_docs".to_string(),
            chunk_size: 1200,
            chunk_overlap: 200,
            reset: false,
        };
        ingest(&options, &TrigramProvider::new(256), &ProgressReporter::noop())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_index_is_empty() {
        let temp = TempDir::new().unwrap();
        let results = retrieve(
            &temp.path().join("index"),
            "local_docs",
            &UnreachableEmbedder,
            "What are cats?",
            5,
            None,
        )
        .await
        .unwrap();

        assert!(results.is_empty());
        assert!(!temp.path().join("index").exists());
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let temp = TempDir::new().unwrap();
        ingest_cats(temp.path()).await;

        let results = retrieve(
            &temp.path().join("index"),
            "other",
            &UnreachableEmbedder,
            "What are cats?",
            5,
            None,
        )
        .await
        .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_ranked() {
        let temp = TempDir::new().unwrap();
        ingest_cats(temp.path()).await;

        let results = retrieve(
            &temp.path().join("index"),
            "local_docs",
            &TrigramProvider::new(256),
            "What are cats?",
            1,
            None,
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.metadata.file_name(), "cats.txt");
    }

    #[tokio::test]
    async fn test_threshold_filters_everything() {
        let temp = TempDir::new().unwrap();
        ingest_cats(temp.path()).await;

        let results = retrieve(
            &temp.path().join("index"),
            "local_docs",
            &TrigramProvider::new(256),
            "What are cats?",
            5,
            Some(1.0),
        )
        .await
        .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_model_mismatch_is_error() {
        let temp = TempDir::new().unwrap();
        ingest_cats(temp.path()).await;

        let result = retrieve(
            &temp.path().join("index"),
            "local_docs",
            &TrigramProvider::new(128),
            "What are cats?",
            5,
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::Knowledge(_))));
    }
}
