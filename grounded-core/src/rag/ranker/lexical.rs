//! TF-IDF ranking with cosine similarity.

use super::Ranker;
use crate::rag::store::DocumentStore;
use crate::rag::types::{RankedResult, ScoredDocument};
use crate::rag::Result;
use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// Tokens are runs of two or more word characters.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Term weights keyed by vocabulary index, sorted by index.
type SparseVector = Vec<(usize, f32)>;

/// Ranks documents by cosine similarity of TF-IDF vectors.
///
/// The vocabulary and inverse document frequencies are computed once from the
/// corpus passed to [`new`](Self::new) and never change afterwards. Query
/// terms missing from that vocabulary carry no weight at all, so a query made
/// only of unknown words ranks nothing.
///
/// Weighting follows the usual smoothed scheme: raw term count times
/// `ln((1 + n) / (1 + df)) + 1`, where `n` is the corpus size and `df` the
/// number of documents containing the term.
///
/// # Example
///
/// ```
/// # use grounded_core::rag::{Document, DocumentStore, LexicalRanker, Ranker};
/// # async fn example() -> grounded_core::rag::Result<()> {
/// let store = DocumentStore::new(vec![
///     Document::new("d1", "Dental deductible is $50 individual."),
///     Document::new("d2", "Vision plan covers one exam a year."),
/// ])?;
/// let ranker = LexicalRanker::new(&store);
///
/// let ranked = ranker.rank("dental coverage", &store, 5).await?;
/// assert_eq!(ranked.ids(), vec!["d1"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LexicalRanker {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    /// Document text and vector computed at construction, keyed by document id
    document_vectors: HashMap<String, (String, SparseVector)>,
}

impl LexicalRanker {
    /// Builds the vocabulary and document vectors from `corpus`.
    pub fn new(corpus: &DocumentStore) -> Self {
        let documents = corpus.get_all();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for document in documents {
            let unique: HashSet<String> = tokenize(&document.text).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
        }

        let mut ranker = Self {
            vocabulary,
            idf,
            document_vectors: HashMap::with_capacity(documents.len()),
        };

        for document in documents {
            let vector = ranker.vectorize(&document.text);
            ranker
                .document_vectors
                .insert(document.id.clone(), (document.text.clone(), vector));
        }

        debug!(
            documents = documents.len(),
            vocabulary = ranker.vocabulary.len(),
            "Built lexical index"
        );

        ranker
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Computes the TF-IDF vector of `text` under the fixed vocabulary.
    fn vectorize(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();

        for term in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect()
    }
}

#[async_trait]
impl Ranker for LexicalRanker {
    async fn rank(&self, query: &str, corpus: &DocumentStore, k: usize) -> Result<RankedResult> {
        if k == 0 || corpus.is_empty() {
            return Ok(RankedResult::empty());
        }

        let query_vector = self.vectorize(query);
        if query_vector.is_empty() {
            debug!(query, "No query terms in vocabulary");
            return Ok(RankedResult::empty());
        }

        let mut scored = Vec::new();
        for document in corpus.get_all() {
            // Documents unseen at construction, or whose text changed, are
            // vectorized on demand.
            let score = match self.document_vectors.get(&document.id) {
                Some((text, vector)) if *text == document.text => {
                    cosine_similarity(&query_vector, vector)
                }
                _ => cosine_similarity(&query_vector, &self.vectorize(&document.text)),
            };

            if score > 0.0 {
                scored.push(ScoredDocument {
                    document: document.clone(),
                    score,
                });
            }
        }

        debug!(matched = scored.len(), k, "Lexical ranking complete");
        Ok(RankedResult::from_scored(scored, k))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
}

/// Computes cosine similarity between two sparse vectors.
///
/// Returns 0.0 when either vector has zero magnitude.
fn cosine_similarity(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut dot_product = 0.0f32;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot_product += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    let magnitude_a: f32 = a.iter().map(|(_, x)| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|(_, x)| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::Document;

    fn corpus(docs: &[(&str, &str)]) -> DocumentStore {
        DocumentStore::new(docs.iter().map(|(id, text)| Document::new(*id, *text)).collect()).unwrap()
    }

    fn benefits() -> DocumentStore {
        corpus(&[
            ("d1", "Dental deductible is $50 individual, $150 family."),
            ("d2", "Vision coverage includes one eye exam per year."),
            ("d3", "Medical deductible is $500 individual, $1500 family."),
            ("d4", "Dental cleanings are covered twice per year."),
            ("d5", "The office is closed on public holidays."),
        ])
    }

    fn assert_ranking_invariants(ranked: &RankedResult, k: usize, corpus_size: usize) {
        assert!(ranked.len() <= k.min(corpus_size));

        let scores: Vec<f32> = ranked.iter().map(|r| r.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores not sorted: {:?}", scores);

        let ids: HashSet<&str> = ranked.ids().into_iter().collect();
        assert_eq!(ids.len(), ranked.len());
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("What are MY dental-benefits? a $50").collect();
        assert_eq!(tokens, vec!["what", "are", "my", "dental", "benefits", "50"]);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![(0, 1.0), (2, 1.0)];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);

        let b = vec![(1, 1.0)];
        assert_eq!(cosine_similarity(&a, &b), 0.0);

        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }

    #[tokio::test]
    async fn test_single_document_match() {
        let store = corpus(&[("d1", "Dental deductible is $50 individual, $150 family.")]);
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("What are my dental benefits?", &store, 1).await.unwrap();
        assert_eq!(ranked.ids(), vec!["d1"]);
        assert!(ranked.iter().next().unwrap().score > 0.0);
    }

    #[tokio::test]
    async fn test_rare_terms_weigh_more() {
        let store = corpus(&[
            ("a", "cat dog"),
            ("b", "cat bird"),
            ("c", "cat fish"),
        ]);
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("cat fish", &store, 3).await.unwrap();
        assert_eq!(ranked.ids()[0], "c");
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_query_terms_carry_no_weight() {
        let store = benefits();
        let ranker = LexicalRanker::new(&store);

        let plain = ranker.rank("dental", &store, 5).await.unwrap();
        let noisy = ranker.rank("dental orthodontics braces", &store, 5).await.unwrap();

        assert_eq!(plain, noisy);
    }

    #[tokio::test]
    async fn test_only_unknown_terms_ranks_nothing() {
        let store = benefits();
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("orthodontics braces", &store, 5).await.unwrap();
        assert!(ranked.is_empty());

        let ranked = ranker.rank("? !", &store, 5).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_zero_score_documents_excluded() {
        let store = benefits();
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("holidays", &store, 5).await.unwrap();
        assert_eq!(ranked.ids(), vec!["d5"]);
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let store = DocumentStore::new(Vec::new()).unwrap();
        let ranker = LexicalRanker::new(&store);

        assert_eq!(ranker.vocabulary_size(), 0);
        let ranked = ranker.rank("anything at all", &store, 15).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_zero_k() {
        let store = benefits();
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("dental", &store, 0).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_corpus_order() {
        let store = corpus(&[
            ("x", "unrelated words here"),
            ("b", "apple pie"),
            ("a", "apple pie"),
            ("c", "apple pie"),
        ]);
        let ranker = LexicalRanker::new(&store);

        let ranked = ranker.rank("apple", &store, 10).await.unwrap();
        assert_eq!(ranked.ids(), vec!["b", "a", "c"]);

        let ranked = ranker.rank("apple", &store, 2).await.unwrap();
        assert_eq!(ranked.ids(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_ranking_invariants_hold() {
        let store = benefits();
        let ranker = LexicalRanker::new(&store);
        let queries = [
            "dental deductible",
            "family individual deductible",
            "per year",
            "exam",
            "what is covered",
        ];

        for query in queries {
            for k in 0..=7 {
                let ranked = ranker.rank(query, &store, k).await.unwrap();
                assert_ranking_invariants(&ranked, k, store.len());
            }
        }
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic() {
        let store = benefits();
        let first = LexicalRanker::new(&store).rank("deductible family", &store, 3).await.unwrap();

        for _ in 0..5 {
            let again = LexicalRanker::new(&store).rank("deductible family", &store, 3).await.unwrap();
            assert_eq!(first, again);
        }
    }

    #[tokio::test]
    async fn test_documents_outside_build_corpus() {
        let built = corpus(&[("d1", "dental plan"), ("d2", "vision plan")]);
        let ranker = LexicalRanker::new(&built);

        let other = corpus(&[("n1", "new dental brochure"), ("n2", "nothing relevant")]);
        let ranked = ranker.rank("dental", &other, 5).await.unwrap();

        assert_eq!(ranked.ids(), vec!["n1"]);
    }

    #[tokio::test]
    async fn test_reused_id_with_new_text_is_rescored() {
        let built = corpus(&[("d1", "dental plan"), ("d2", "vision plan")]);
        let ranker = LexicalRanker::new(&built);

        let changed = corpus(&[("d1", "vision exam"), ("d2", "dental cleaning")]);
        let ranked = ranker.rank("dental", &changed, 5).await.unwrap();

        assert_eq!(ranked.ids(), vec!["d2"]);
    }
}
