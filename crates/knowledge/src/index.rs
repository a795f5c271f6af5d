//! SQLite-backed vector index for knowledge chunks.

use crate::types::{ChunkMetadata, DocumentChunk, ScoredChunk};
use crate::vector_index::{CollectionInfo, CollectionStats, VectorIndex};
use chrono::{DateTime, Utc};
use localrag_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// File name of the store inside the persist directory.
pub const INDEX_FILE_NAME: &str = "index.sqlite";

/// Path of the store for a persist directory.
pub fn index_path(persist_dir: &Path) -> PathBuf {
    persist_dir.join(INDEX_FILE_NAME)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    embedding_provider TEXT NOT NULL,
    embedding_model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    collection TEXT NOT NULL,
    text TEXT NOT NULL,
    source TEXT NOT NULL,
    page INTEGER,
    content_hash TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
"#;

/// Vector index stored in a single SQLite file.
pub struct SqliteIndex {
    conn: Connection,
    path: PathBuf,
}

impl SqliteIndex {
    /// Open the store, creating the file and tables if needed.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", path);
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open the store only if the file already exists.
    pub fn open_existing(path: &Path) -> AppResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::open(path).map(Some)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SqliteIndex {
    /// Write the collection record and chunks in one transaction, optionally
    /// clearing the collection first. Nothing changes if any statement fails.
    fn write_chunks(
        &mut self,
        info: &CollectionInfo,
        chunks: &[DocumentChunk],
        replace: bool,
    ) -> AppResult<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        if replace {
            tx.execute("DELETE FROM chunks WHERE collection = ?1", params![info.name])
                .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO collections
                 (name, embedding_provider, embedding_model, dimensions, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                info.name,
                info.embedding_provider,
                info.embedding_model,
                info.dimensions as i64,
                info.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to record collection: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO chunks
                         (id, collection, text, source, page, content_hash, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;

            for chunk in chunks {
                stmt.execute(params![
                    chunk.id,
                    chunk.collection,
                    chunk.text,
                    chunk.metadata.source,
                    chunk.metadata.page.map(i64::from),
                    chunk.content_hash,
                    embedding_to_bytes(&chunk.embedding),
                    chunk.created_at.to_rfc3339(),
                ])
                .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit chunks: {}", e)))?;

        tracing::debug!(
            replace,
            "Wrote {} chunks into collection '{}'",
            chunks.len(),
            info.name
        );
        Ok(chunks.len())
    }
}

impl VectorIndex for SqliteIndex {
    fn insert_chunks(
        &mut self,
        info: &CollectionInfo,
        chunks: &[DocumentChunk],
    ) -> AppResult<usize> {
        self.write_chunks(info, chunks, false)
    }

    fn replace_chunks(
        &mut self,
        info: &CollectionInfo,
        chunks: &[DocumentChunk],
    ) -> AppResult<usize> {
        let written = self.write_chunks(info, chunks, true)?;
        tracing::info!("Replaced collection '{}'", info.name);
        Ok(written)
    }

    fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<ScoredChunk>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, text, source, page, content_hash, embedding, created_at
                 FROM chunks WHERE collection = ?1",
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok(RawChunk {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    source: row.get(2)?,
                    page: row.get(3)?,
                    content_hash: row.get(4)?,
                    embedding: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let raw =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
            let chunk = raw.into_chunk(collection)?;
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            results.push(ScoredChunk { chunk, score });
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT embedding_provider, embedding_model, dimensions, updated_at
                 FROM collections WHERE name = ?1",
                params![collection],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| AppError::Knowledge(format!("Failed to read collection: {}", e)))?;

        row.map(|(provider, model, dimensions, updated_at)| {
            Ok(CollectionInfo {
                name: collection.to_string(),
                embedding_provider: provider,
                embedding_model: model,
                dimensions: dimensions as usize,
                updated_at: parse_timestamp(&updated_at)?,
            })
        })
        .transpose()
    }

    fn stats(&self, collection: &str) -> AppResult<CollectionStats> {
        self.conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT source) FROM chunks WHERE collection = ?1",
                params![collection],
                |row| {
                    Ok(CollectionStats {
                        chunks: row.get::<_, i64>(0)? as u64,
                        sources: row.get::<_, i64>(1)? as u64,
                    })
                },
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))
    }
}

struct RawChunk {
    id: String,
    text: String,
    source: String,
    page: Option<i64>,
    content_hash: String,
    embedding: Vec<u8>,
    created_at: String,
}

impl RawChunk {
    fn into_chunk(self, collection: &str) -> AppResult<DocumentChunk> {
        Ok(DocumentChunk {
            id: self.id,
            collection: collection.to_string(),
            text: self.text,
            metadata: ChunkMetadata {
                source: self.source,
                page: self.page.map(|p| p as u32),
            },
            content_hash: self.content_hash,
            embedding: bytes_to_embedding(&self.embedding)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Knowledge(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Little-endian f32 encoding.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
