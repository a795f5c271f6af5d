//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Local retrieval first, web fallback second, then model synthesis.

pub mod context;
pub mod pipeline;
pub mod session;
pub mod types;

pub use context::ContextSource;
pub use pipeline::RagPipeline;
pub use session::{ChatSession, Role, Turn};
pub use types::{Answer, NO_CONTEXT_PLACEHOLDER};
