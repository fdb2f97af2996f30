//! Relevance ranking strategies.
//!
//! Two interchangeable strategies implement [`Ranker`]:
//!
//! - [`LexicalRanker`]: TF-IDF vectors and cosine similarity over a vocabulary
//!   fixed at construction time
//! - [`IndexRanker`]: delegates scoring to a [`SimilarityIndex`](super::index::SimilarityIndex)
//!
//! Both return a [`RankedResult`] holding at most `k` documents, with
//! non-increasing scores, unique ids, and ties kept in corpus order.

mod index;
mod lexical;

pub use index::IndexRanker;
pub use lexical::LexicalRanker;

use super::store::DocumentStore;
use super::types::RankedResult;
use super::Result;
use async_trait::async_trait;

/// Scores and orders corpus documents against a query.
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Returns the `k` most relevant documents of `corpus` for `query`.
    ///
    /// An empty corpus, `k == 0`, or a query nothing can be scored against
    /// all yield an empty result rather than an error.
    async fn rank(&self, query: &str, corpus: &DocumentStore, k: usize) -> Result<RankedResult>;

    /// Short strategy name used in logs.
    fn name(&self) -> &str;
}
