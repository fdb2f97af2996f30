//! Similarity index abstraction and in-memory implementation.
//!
//! The index-backed ranking strategy only needs something that answers
//! `(query, top_k)` with scored passages. Persistent backends live outside this
//! crate and implement [`SimilarityIndex`]; [`InMemoryIndex`] covers small
//! corpora that fit in memory.

use super::types::Document;
use crate::provider::Embedder;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// A passage returned by a similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub text: String,
    pub score: f32,
}

impl IndexHit {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Nearest-neighbor search over a prebuilt index.
///
/// Implementations must be populated before the pipeline serves requests and
/// are only read afterwards.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Searches for the passages most similar to `query`.
    ///
    /// # Returns
    ///
    /// At most `top_k` hits, sorted by descending similarity score.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<IndexHit>>;
}

/// An in-memory embedding index.
///
/// Every document is embedded once at build time. Searches embed the query and
/// perform a linear scan with cosine similarity.
///
/// # When to Use
///
/// Suitable for small to medium corpora (a few thousand passages). For larger
/// collections, implement [`SimilarityIndex`] over a dedicated vector database.
pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<(String, Vec<f32>)>,
}

impl InMemoryIndex {
    /// Embeds `documents` and builds the index.
    ///
    /// # Errors
    ///
    /// Returns an error if any embedding request fails.
    pub async fn build(embedder: Arc<dyn Embedder>, documents: &[Document]) -> Result<Self> {
        let mut entries = Vec::with_capacity(documents.len());

        for document in documents {
            let embedding = embedder.embed(&document.text).await?;
            debug!(target: "grounded_core::rag", id = %document.id, dim = embedding.len(), "Embedded document");
            entries.push((document.text.clone(), embedding));
        }

        info!("Built in-memory index with {} documents", entries.len());
        Ok(Self { embedder, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SimilarityIndex for InMemoryIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<IndexHit>> {
        if top_k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut hits: Vec<IndexHit> = self
            .entries
            .iter()
            .map(|(text, embedding)| {
                let score = cosine_similarity(&query_embedding, embedding);
                IndexHit {
                    text: text.clone(),
                    score: if score.is_nan() { f32::NEG_INFINITY } else { score },
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);

        Ok(hits)
    }
}

/// Computes cosine similarity between two vectors.
///
/// Returns values from -1.0 (opposite) to 1.0 (identical), with 0.0 indicating
/// orthogonal vectors. Returns 0.0 for mismatched lengths or zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
