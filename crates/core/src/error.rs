//! Error types for localrag.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM, knowledge store, web search,
//! prompt rendering and serialization.

use thiserror::Error;

/// Unified error type for localrag.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM and embedding provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Ingestion, vector store and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search errors (swallowed by the fallback path)
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Knowledge("No documents found".to_string());
        assert_eq!(err.to_string(), "Knowledge error: No documents found");

        let err = AppError::Search("timeout".to_string());
        assert_eq!(err.to_string(), "Search error: timeout");
    }

    #[test]
    fn test_from_yaml_error() {
        let parse: Result<Vec<u32>, serde_yaml::Error> = serde_yaml::from_str("[1, two");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
