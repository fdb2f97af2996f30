//! Read-only document store.
//!
//! The store owns the corpus for the lifetime of the pipeline. It is populated
//! once, before any request is served, and never mutated afterwards, so it can
//! be shared across concurrent requests behind an `Arc` without locking.

use super::types::Document;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when building or querying the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    #[error("Failed to read corpus file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse corpus file: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// An immutable, ordered collection of documents with unique ids.
///
/// Insertion order is preserved and is the order rankers use to break ties.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
}

impl DocumentStore {
    /// Creates a store from documents, rejecting repeated ids.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(documents.len());

        for (position, document) in documents.iter().enumerate() {
            if positions.insert(document.id.clone(), position).is_some() {
                return Err(StoreError::DuplicateId(document.id.clone()));
            }
        }

        Ok(Self { documents, positions })
    }

    /// Loads a corpus file holding an array of documents.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let documents: Vec<Document> = if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse(e.to_string()))?
        } else {
            serde_json::from_str(&contents).map_err(|e| StoreError::Parse(e.to_string()))?
        };

        tracing::info!(path = %path.display(), documents = documents.len(), "Loaded corpus");
        Self::new(documents)
    }

    /// Returns every document in insertion order.
    pub fn get_all(&self) -> &[Document] {
        &self.documents
    }

    pub fn get_by_id(&self, id: &str) -> Result<&Document> {
        self.positions
            .get(id)
            .map(|&position| &self.documents[position])
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Returns the corpus position and document of the first document whose
    /// text is exactly `text`.
    pub fn find_by_text(&self, text: &str) -> Option<(usize, &Document)> {
        self.documents.iter().enumerate().find(|(_, d)| d.text == text)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
