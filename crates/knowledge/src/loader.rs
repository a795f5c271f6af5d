//! Document discovery and loading.
//!
//! PDFs live under `<data>/pdf`, text and markdown under `<data>/txt`.
//! Text files load as a single document; PDFs load one document per page.

use crate::types::ChunkMetadata;
use localrag_core::{AppError, AppResult};
use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a supported source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the kind from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" => Some(Self::Text),
            _ => None,
        }
    }

    /// Subdirectory of the data root holding files of this kind.
    pub fn subdir(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

/// A loaded unit of text with its origin.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Files found under the data root.
#[derive(Debug, Default)]
pub struct SourceFiles {
    pub pdf: Vec<PathBuf>,
    pub text: Vec<PathBuf>,
}

impl SourceFiles {
    pub fn len(&self) -> usize {
        self.pdf.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recursively find supported files under `<data>/pdf` and `<data>/txt`.
///
/// Missing subdirectories are treated as empty.
pub fn discover(data_dir: &Path) -> SourceFiles {
    SourceFiles {
        pdf: collect_files(&data_dir.join(DocumentKind::Pdf.subdir()), DocumentKind::Pdf),
        text: collect_files(&data_dir.join(DocumentKind::Text.subdir()), DocumentKind::Text),
    }
}

fn collect_files(dir: &Path, kind: DocumentKind) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::debug!("Skipping missing directory {:?}", dir);
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| DocumentKind::from_path(path) == Some(kind))
        .collect();

    files.sort();
    files
}

/// Load a UTF-8 text or markdown file as one document.
///
/// Returns `None` for whitespace-only files.
pub fn load_text(path: &Path) -> AppResult<Option<LoadedDocument>> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(LoadedDocument {
        text,
        metadata: ChunkMetadata::for_file(path),
    }))
}

/// Load a PDF as one document per page with extractable text.
pub fn load_pdf(path: &Path) -> AppResult<Vec<LoadedDocument>> {
    let document = Document::load(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to parse PDF {:?}: {}", path, e)))?;

    let mut pages = Vec::new();
    for page_no in document.get_pages().into_keys() {
        let text = match document.extract_text(&[page_no]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping page {} of {:?}: {}", page_no, path, e);
                continue;
            }
        };

        if !text.trim().is_empty() {
            pages.push(LoadedDocument {
                text,
                metadata: ChunkMetadata::for_page(path, page_no),
            });
        }
    }

    Ok(pages)
}

/// Copy user-supplied files into the data root, routed by extension.
///
/// All paths are checked before anything is copied; an unsupported
/// extension or a missing file rejects the whole batch.
pub fn import_files(data_dir: &Path, paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut planned = Vec::with_capacity(paths.len());

    for path in paths {
        if !path.is_file() {
            return Err(AppError::Knowledge(format!("File not found: {:?}", path)));
        }
        let kind = DocumentKind::from_path(path).ok_or_else(|| {
            AppError::Knowledge(format!(
                "Unsupported file type: {:?}. Supported: .pdf, .txt, .md",
                path
            ))
        })?;
        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::Knowledge(format!("Invalid file name: {:?}", path)))?;

        planned.push((path, data_dir.join(kind.subdir()).join(file_name)));
    }

    let mut written = Vec::with_capacity(planned.len());
    for (source, target) in planned {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &target)?;
        tracing::info!("Copied {:?} to {:?}", source, target);
        written.push(target);
    }

    Ok(written)
}
