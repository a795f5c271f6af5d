//! Ingestion: data directory to vector store.

use crate::chunker::{chunk_documents, ChunkCandidate};
use crate::embeddings::EmbeddingProvider;
use crate::index::{index_path, SqliteIndex};
use crate::loader::{self, LoadedDocument};
use crate::progress::ProgressReporter;
use crate::types::{DocumentChunk, IngestOptions, IngestStats};
use crate::vector_index::{CollectionInfo, VectorIndex};
use chrono::Utc;
use localrag_core::{AppError, AppResult};
use std::path::Path;
use std::time::Instant;

/// Texts sent to the embedder per call.
const EMBED_BATCH_SIZE: usize = 32;

/// Load, chunk and embed everything under the data directory, then write it
/// to the collection in one transaction.
///
/// Nothing is written until every chunk is embedded, so a failed run leaves
/// the store as it was (or absent). With `reset`, the collection is replaced
/// in the same transaction as the insert; otherwise chunks are appended.
pub async fn ingest(
    options: &IngestOptions,
    embedder: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!(
        "Starting ingestion from {:?} into collection '{}'",
        options.data_dir,
        options.collection
    );

    let files = loader::discover(&options.data_dir);
    progress.discover(files.pdf.len(), files.text.len());

    let documents = load_all(&files.pdf, &files.text, progress);
    if documents.is_empty() {
        return Err(AppError::Knowledge(format!(
            "No documents found under {:?}. Add .pdf files to pdf/ or .txt/.md files to txt/",
            options.data_dir
        )));
    }

    let candidates = chunk_documents(&documents, options.chunk_size, options.chunk_overlap)?;
    progress.chunk(documents.len(), candidates.len());

    let path = index_path(&options.persist_dir);
    if !options.reset {
        if let Some(existing) = SqliteIndex::open_existing(&path)? {
            check_model(&existing, &options.collection, embedder)?;
        }
    }

    let embeddings = embed_all(&candidates, embedder, progress).await?;

    let now = Utc::now();
    let chunks: Vec<DocumentChunk> = candidates
        .into_iter()
        .zip(embeddings)
        .map(|(candidate, embedding)| DocumentChunk {
            id: uuid::Uuid::new_v4().to_string(),
            collection: options.collection.clone(),
            text: candidate.text,
            metadata: candidate.metadata,
            content_hash: candidate.content_hash,
            embedding,
            created_at: now,
        })
        .collect();

    let info = CollectionInfo {
        name: options.collection.clone(),
        embedding_provider: embedder.provider_name().to_string(),
        embedding_model: embedder.model_name().to_string(),
        dimensions: embedder.dimensions(),
        updated_at: now,
    };

    progress.index(chunks.len(), &options.collection);
    let mut index = SqliteIndex::open(&path)?;
    let written = if options.reset {
        index.replace_chunks(&info, &chunks)?
    } else {
        index.insert_chunks(&info, &chunks)?
    };

    let stats = IngestStats {
        pdf_files: files.pdf.len() as u32,
        text_files: files.text.len() as u32,
        documents: documents.len() as u32,
        chunks: written as u32,
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        "Ingestion completed: {} documents, {} chunks in {:.2}s",
        stats.documents,
        stats.chunks,
        stats.duration_secs
    );

    Ok(stats)
}

fn load_all(
    pdf_files: &[std::path::PathBuf],
    text_files: &[std::path::PathBuf],
    progress: &ProgressReporter,
) -> Vec<LoadedDocument> {
    let total = pdf_files.len() + text_files.len();
    let mut documents = Vec::new();

    for (i, path) in pdf_files.iter().enumerate() {
        progress.load(i + 1, total, &display_name(path));
        match loader::load_pdf(path) {
            Ok(pages) => documents.extend(pages),
            Err(e) => tracing::warn!("Skipping unreadable PDF: {}", e),
        }
    }

    for (i, path) in text_files.iter().enumerate() {
        progress.load(pdf_files.len() + i + 1, total, &display_name(path));
        match loader::load_text(path) {
            Ok(Some(document)) => documents.push(document),
            Ok(None) => tracing::debug!("Skipping empty file {:?}", path),
            Err(e) => tracing::warn!("Skipping unreadable file: {}", e),
        }
    }

    documents
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Appending vectors from another model would make the collection unsearchable.
fn check_model(
    index: &SqliteIndex,
    collection: &str,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<()> {
    match index.collection_info(collection)? {
        Some(info)
            if !info.matches(
                embedder.provider_name(),
                embedder.model_name(),
                embedder.dimensions(),
            ) =>
        {
            Err(AppError::Knowledge(format!(
                "Collection '{}' was built with {}/{}; re-ingest with reset to switch to {}/{}",
                collection,
                info.embedding_provider,
                info.embedding_model,
                embedder.provider_name(),
                embedder.model_name()
            )))
        }
        _ => Ok(()),
    }
}

async fn embed_all(
    candidates: &[ChunkCandidate],
    embedder: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(candidates.len());

    for batch in candidates.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(AppError::Knowledge(format!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        embeddings.extend(vectors);
        progress.embed(embeddings.len(), candidates.len(), embedder.model_name());
    }

    Ok(embeddings)
}
