//! grounded-core - Retrieval and grounded answer synthesis
//!
//! Provides the components for answering questions from a fixed corpus:
//! - Document store and relevance ranking (TF-IDF or similarity index)
//! - Context assembly and prompt construction
//! - Generation through a model provider (Ollama)
//! - Reasoning/answer decomposition of model output
//! - Configuration management
//!
//! ## Primary API
//!
//! Users should interact with grounded via [`RagPipeline`].

// Public modules
pub mod config;
pub mod provider;
pub mod rag;

// Public exports
pub use config::{Config, RankingStrategy};
pub use rag::{
    Document, DocumentStore, GenerationResult, RagError, RagPipeline, RankedResult, Ranker,
};

// Provider exports
pub use provider::{Embedder, Generation, GenerationError, Generator};
