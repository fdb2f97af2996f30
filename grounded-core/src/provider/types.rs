//! Common types for model providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when calling a generation endpoint.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The endpoint could not be reached or answered with a non-success status.
    #[error("Generation endpoint unavailable: {0}")]
    Unavailable(String),

    /// The endpoint answered, but the body is not the expected envelope.
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur when calling an embedding endpoint.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    /// The API response contained no embeddings.
    #[error("No embeddings returned")]
    NoEmbeddings,
}

/// Raw, unparsed output of a single generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Free-form model text, possibly carrying reasoning markers
    pub response: String,
    /// Textual context entries returned alongside the response, if any
    #[serde(default)]
    pub context: Vec<String>,
}

impl Generation {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }
}

/// A generative model endpoint.
///
/// One call per pipeline invocation. Implementations do not retry; retry and
/// timeout policy belong to the caller.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Send a rendered prompt and return the model's raw output.
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}

/// Converts text into vector embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbedError>;
}
