//! Embedding providers.
//!
//! The same provider and model must be used for ingestion and querying;
//! the vector store records which model built each collection.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
