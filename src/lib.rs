//! grounded - Retrieval and grounded answer synthesis
//!
//! This is the convenience wrapper crate that re-exports the grounded
//! components.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! grounded = "0.1"
//! ```

// Re-export core
pub use grounded_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use grounded_core::rag::{
        ContextAssembler, IndexHit, IndexRanker, InMemoryIndex, LexicalRanker, PromptBuilder,
        SimilarityIndex,
    };
    pub use grounded_core::*;
}
