use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of retrievable text.
///
/// Documents are the fundamental unit of the corpus. Each document carries a
/// stable identifier, its full text, and optional metadata for tracking
/// source information. Documents are immutable once placed in a
/// [`DocumentStore`](super::DocumentStore).
///
/// # Example
///
/// ```
/// # use grounded_core::rag::Document;
/// let doc = Document::new("benefits_3", "Dental deductible is $50 individual.")
///     .with_metadata("source", "benefits.pdf")
///     .with_metadata("page", "3");
/// assert_eq!(doc.metadata["page"], "3");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A document paired with its relevance score for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Documents ranked against a query, most relevant first.
///
/// Rankers guarantee that scores never increase along the sequence, that no
/// document id appears twice, and that ties keep corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult {
    results: Vec<ScoredDocument>,
}

impl RankedResult {
    /// Builds a ranked result from scored documents.
    ///
    /// Duplicate ids are dropped (first occurrence wins), then the remainder is
    /// stable-sorted by descending score and cut to `k`. Because the sort is
    /// stable, equal scores keep the order in which they were supplied. A NaN
    /// score is treated as negative infinity so it ranks last.
    pub fn from_scored(scored: Vec<ScoredDocument>, k: usize) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut results: Vec<ScoredDocument> = scored
            .into_iter()
            .filter(|s| seen.insert(s.document.id.clone()))
            .map(|mut s| {
                if s.score.is_nan() {
                    s.score = f32::NEG_INFINITY;
                }
                s
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Self { results }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredDocument> {
        self.results.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.document.id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a ScoredDocument;
    type IntoIter = std::slice::Iter<'a, ScoredDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// A query-ready prompt and the inputs it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub query: String,
    pub context: String,
    pub rendered_prompt: String,
}

/// The answer to one query, as handed to callers.
///
/// This four-field shape is the stable contract UI and CLI layers consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub prompt: String,
    pub reasoning: String,
    pub answer: String,
    pub relevant_documents: Vec<String>,
}
