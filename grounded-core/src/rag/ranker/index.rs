//! Ranking delegated to an external similarity index.

use super::Ranker;
use crate::rag::index::SimilarityIndex;
use crate::rag::store::DocumentStore;
use crate::rag::types::{Document, RankedResult, ScoredDocument};
use crate::rag::{RagError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ranks documents by asking a [`SimilarityIndex`] for nearest neighbors.
///
/// Index hits carry only text, so each hit is matched back to the first corpus
/// document with identical text. Hits with no corpus counterpart are kept as
/// synthetic documents identified `hit-<n>`, `n` being the hit's position in
/// the index response.
///
/// Equal scores are ordered by corpus position, with synthetic documents
/// after every corpus document.
#[derive(Clone)]
pub struct IndexRanker {
    index: Arc<dyn SimilarityIndex>,
}

impl IndexRanker {
    pub fn new(index: Arc<dyn SimilarityIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Ranker for IndexRanker {
    async fn rank(&self, query: &str, corpus: &DocumentStore, k: usize) -> Result<RankedResult> {
        if k == 0 || corpus.is_empty() {
            return Ok(RankedResult::empty());
        }

        let hits = self
            .index
            .search(query, k)
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        debug!(hits = hits.len(), k, "Similarity index search complete");

        let mut scored: Vec<(usize, ScoredDocument)> = hits
            .into_iter()
            .enumerate()
            .map(|(position, hit)| {
                let (order, document) = match corpus.find_by_text(&hit.text) {
                    Some((order, document)) => (order, document.clone()),
                    None => {
                        warn!(position, "Index hit has no matching corpus document");
                        (
                            corpus.len() + position,
                            Document::new(format!("hit-{}", position), hit.text),
                        )
                    }
                };
                (
                    order,
                    ScoredDocument {
                        document,
                        score: hit.score,
                    },
                )
            })
            .collect();

        // Equal scores fall back to corpus order; synthetic hits sort after the corpus.
        scored.sort_by_key(|(order, _)| *order);
        let scored = scored.into_iter().map(|(_, s)| s).collect();

        Ok(RankedResult::from_scored(scored, k))
    }

    fn name(&self) -> &str {
        "embedding"
    }
}
