//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use localrag_core::config::{AppConfig, RetrievalDefaults};
use localrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Allowed number of retrieved chunks per query.
pub const K_RANGE: RangeInclusive<usize> = 1..=12;

/// Allowed number of web results per fallback search.
pub const WEB_K_RANGE: RangeInclusive<usize> = 1..=10;

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the source file
    pub source: String,

    /// 1-based page number (PDF only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ChunkMetadata {
    /// Metadata for a file without page structure.
    pub fn for_file(path: &Path) -> Self {
        Self {
            source: path.to_string_lossy().to_string(),
            page: None,
        }
    }

    /// Metadata for a single PDF page.
    pub fn for_page(path: &Path, page: u32) -> Self {
        Self {
            source: path.to_string_lossy().to_string(),
            page: Some(page),
        }
    }

    /// File name of the source, falling back to the full path.
    pub fn file_name(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.source)
    }

    /// Human-readable citation label: `file.pdf (page 3)` or `notes.txt`.
    pub fn citation_label(&self) -> String {
        match self.page {
            Some(page) => format!("{} (page {})", self.file_name(), page),
            None => self.file_name().to_string(),
        }
    }
}

/// A stored, embedded piece of a document. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Collection the chunk belongs to
    pub collection: String,

    /// Chunk text
    pub text: String,

    /// Source file and page
    pub metadata: ChunkMetadata,

    /// SHA-256 of the chunk text (hex)
    pub content_hash: String,

    /// Embedding vector
    #[serde(skip)]
    pub embedding: Vec<f32>,

    /// When the chunk was indexed
    pub created_at: DateTime<Utc>,
}

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    /// Cosine similarity, higher is more relevant
    pub score: f32,
}

/// Kind of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Local,
    Web,
}

/// A reference to a piece of context used for an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: CitationKind,
    pub label: String,
}

impl Citation {
    /// Citation for a local chunk.
    pub fn local(metadata: &ChunkMetadata) -> Self {
        Self {
            kind: CitationKind::Local,
            label: metadata.citation_label(),
        }
    }

    /// Citation for a web hit, labelled by its URL.
    pub fn web(url: impl Into<String>) -> Self {
        Self {
            kind: CitationKind::Web,
            label: url.into(),
        }
    }
}

/// Which kind of context an answer was grounded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Web,
    #[serde(rename = "none")]
    Empty,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Web => "web",
            Self::Empty => "none",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl WebHit {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Per-query retrieval parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve
    pub k: usize,

    /// Whether `threshold` filters the retrieved chunks
    pub use_threshold: bool,

    /// Minimum cosine similarity
    pub threshold: f32,

    /// Number of web results on fallback
    pub web_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::from(&RetrievalDefaults::default())
    }
}

impl From<&RetrievalDefaults> for RetrievalConfig {
    fn from(defaults: &RetrievalDefaults) -> Self {
        Self {
            k: defaults.k.clamp(*K_RANGE.start(), *K_RANGE.end()),
            use_threshold: defaults.use_threshold,
            threshold: defaults.threshold.clamp(0.0, 1.0),
            web_k: defaults.web_k.clamp(*WEB_K_RANGE.start(), *WEB_K_RANGE.end()),
        }
    }
}

impl RetrievalConfig {
    /// The effective threshold, if enabled.
    pub fn threshold(&self) -> Option<f32> {
        self.use_threshold.then_some(self.threshold)
    }

    pub fn set_k(&mut self, k: usize) -> AppResult<()> {
        if !K_RANGE.contains(&k) {
            return Err(AppError::Config(format!(
                "k must be between {} and {}",
                K_RANGE.start(),
                K_RANGE.end()
            )));
        }
        self.k = k;
        Ok(())
    }

    pub fn set_web_k(&mut self, web_k: usize) -> AppResult<()> {
        if !WEB_K_RANGE.contains(&web_k) {
            return Err(AppError::Config(format!(
                "web results must be between {} and {}",
                WEB_K_RANGE.start(),
                WEB_K_RANGE.end()
            )));
        }
        self.web_k = web_k;
        Ok(())
    }

    /// Set and enable the relevance threshold.
    pub fn set_threshold(&mut self, threshold: f32) -> AppResult<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(
                "threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.threshold = threshold;
        self.use_threshold = true;
        Ok(())
    }
}

/// Options for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Data root containing `pdf/` and `txt/`
    pub data_dir: PathBuf,

    /// Directory holding the vector store
    pub persist_dir: PathBuf,

    /// Target collection
    pub collection: String,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Clear the collection before writing
    pub reset: bool,
}

impl IngestOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            persist_dir: config.persist_dir.clone(),
            collection: config.collection.clone(),
            chunk_size: config.chunking.chunk_size,
            chunk_overlap: config.chunking.chunk_overlap,
            reset: false,
        }
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// PDF files discovered
    pub pdf_files: u32,

    /// Text and markdown files discovered
    pub text_files: u32,

    /// Documents loaded (one per text file or non-empty PDF page)
    pub documents: u32,

    /// Chunks written
    pub chunks: u32,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Summary of the persisted store for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub index_path: PathBuf,
    pub exists: bool,
    pub collection: String,
    pub chunks: u64,
    pub sources: u64,
    pub embedding_model: Option<String>,
    pub size_bytes: u64,
}
