//! Model provider abstraction layer.
//!
//! This module defines the interfaces the pipeline uses to reach external
//! models: a [`Generator`] for text completion and an [`Embedder`] for the
//! index-backed ranking strategy.

mod types;
pub mod ollama;

// Re-export common types
pub use types::{
    EmbedError,
    Embedder,
    Generation,
    GenerationError,
    Generator,
    Result,
};

// Re-export provider implementations
pub use ollama::{OllamaEmbedder, OllamaGenerator};
