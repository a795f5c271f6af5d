//! Structured progress reporting for ingestion.
//!
//! Ingestion runs through the phases `discover`, `load`, `chunk`, `embed`
//! and `index`; each emits events through an optional callback.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during ingestion.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation
    pub phase: &'static str,

    /// Current progress (files loaded, chunks embedded, etc.)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Human-readable message
    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Percentage complete (0.0 - 100.0), when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|t| {
            if t > 0 {
                (self.current as f64 / t as f64) * 100.0
            } else {
                100.0
            }
        })
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };

        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Reporter that only logs.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    fn emit(&self, phase: &'static str, current: u64, total: Option<u64>, message: String) {
        let event = ProgressEvent {
            phase,
            current,
            total,
            message,
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
        };

        tracing::debug!(
            phase = event.phase,
            current = event.current,
            total = ?event.total,
            elapsed_secs = event.elapsed_secs,
            "{}",
            event.message
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn discover(&self, pdf_files: usize, text_files: usize) {
        self.emit(
            "discover",
            (pdf_files + text_files) as u64,
            None,
            format!("{} pdf, {} text files", pdf_files, text_files),
        );
    }

    pub fn load(&self, current: usize, total: usize, file: &str) {
        self.emit(
            "load",
            current as u64,
            Some(total as u64),
            format!("reading {}", file),
        );
    }

    pub fn chunk(&self, documents: usize, chunks: usize) {
        self.emit(
            "chunk",
            chunks as u64,
            None,
            format!("{} chunks from {} documents", chunks, documents),
        );
    }

    pub fn embed(&self, current: usize, total: usize, model: &str) {
        self.emit(
            "embed",
            current as u64,
            Some(total as u64),
            format!("model={}", model),
        );
    }

    pub fn index(&self, chunks: usize, collection: &str) {
        self.emit(
            "index",
            chunks as u64,
            Some(chunks as u64),
            format!("writing to collection '{}'", collection),
        );
    }
}
