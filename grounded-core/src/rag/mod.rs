//! Retrieval and grounded answer synthesis.
//!
//! This module implements the pipeline that answers a question from a fixed
//! corpus with the help of an external generative model.
//!
//! # Architecture
//!
//! - [`store`]: read-only corpus with lookup by id
//! - [`ranker`]: interchangeable relevance strategies (lexical TF-IDF, similarity index)
//! - [`index`]: similarity index abstraction and an in-memory embedding index
//! - [`context`]: bounded, ordered context assembly
//! - [`prompt`]: deterministic prompt template
//! - [`response`]: reasoning/answer split of the model output
//!
//! # How It Works
//!
//! Each call to [`RagPipeline::answer`] runs strictly in sequence:
//!
//! 1. **Rank**: the configured [`Ranker`] picks the top-k passages
//! 2. **Assemble**: passages are joined, most relevant first, within the size budget
//! 3. **Prompt**: the context and question are rendered into a prompt
//! 4. **Generate**: the prompt goes to the [`Generator`]
//! 5. **Decompose**: the output is split into reasoning and answer
//!
//! When nothing relevant is found the pipeline stops after step 2 and the
//! generator is never called.

pub mod context;
pub mod index;
pub mod prompt;
pub mod ranker;
pub mod response;
pub mod store;
mod types;

pub use context::{Context, ContextAssembler};
pub use index::{IndexHit, InMemoryIndex, SimilarityIndex};
pub use prompt::PromptBuilder;
pub use ranker::{IndexRanker, LexicalRanker, Ranker};
pub use response::{decompose, Decomposed};
pub use store::{DocumentStore, StoreError};
pub use types::{Document, GenerationResult, PromptRecord, RankedResult, ScoredDocument};

use crate::config::{Config, RankingStrategy};
use crate::provider::{GenerationError, Generator, OllamaEmbedder, OllamaGenerator};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Reasoning reported when no passage survives ranking and assembly.
pub const NO_CONTEXT_REASONING: &str = "No relevant context found to answer the question.";

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to retrieve context: {0}")]
    Retrieval(String),
}

pub type Result<T> = std::result::Result<T, RagError>;

/// The retrieval-and-answer pipeline.
///
/// The pipeline keeps no state between requests: the store and ranker are
/// only read, so a single instance can serve concurrent queries when wrapped
/// in an `Arc`.
///
/// # Example
///
/// ```no_run
/// # use grounded_core::{Config, rag::{DocumentStore, RagPipeline}};
/// # use std::sync::Arc;
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load_or_default();
/// let store = Arc::new(DocumentStore::load("corpus.json")?);
/// let pipeline = RagPipeline::from_config(&config, store).await?;
///
/// let result = pipeline.answer("What are my dental benefits?").await?;
/// println!("{}", result.answer);
/// # Ok(())
/// # }
/// ```
pub struct RagPipeline {
    store: Arc<DocumentStore>,
    ranker: Arc<dyn Ranker>,
    generator: Arc<dyn Generator>,
    assembler: ContextAssembler,
    prompt_builder: PromptBuilder,
    top_k: usize,
    max_context_chars: Option<usize>,
}

impl RagPipeline {
    /// Creates a pipeline with default retrieval settings.
    pub fn new(
        store: Arc<DocumentStore>,
        ranker: Arc<dyn Ranker>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let defaults = crate::config::RetrievalConfig::default();
        Self {
            store,
            ranker,
            generator,
            assembler: ContextAssembler::new(),
            prompt_builder: PromptBuilder::default(),
            top_k: defaults.top_k,
            max_context_chars: defaults.max_context_chars,
        }
    }

    /// Builds a pipeline wired from configuration.
    ///
    /// The ranking strategy follows `retrieval.strategy`. The embedding
    /// strategy embeds the whole corpus up front through the Ollama embedding
    /// endpoint, so this call may take a while for large corpora.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] if the embedding index cannot be built.
    pub async fn from_config(config: &Config, store: Arc<DocumentStore>) -> Result<Self> {
        let ranker: Arc<dyn Ranker> = match config.retrieval.strategy {
            RankingStrategy::Lexical => Arc::new(LexicalRanker::new(&store)),
            RankingStrategy::Embedding => {
                let embedder = Arc::new(OllamaEmbedder::new(config));
                let index = InMemoryIndex::build(embedder, store.get_all())
                    .await
                    .map_err(|e| RagError::Retrieval(e.to_string()))?;
                Arc::new(IndexRanker::new(Arc::new(index)))
            }
        };

        let generator = Arc::new(OllamaGenerator::new(config));

        Ok(Self::new(store, ranker, generator)
            .with_top_k(config.retrieval.top_k)
            .with_max_context_chars(config.retrieval.max_context_chars)
            .with_prompt_builder(PromptBuilder::new(&config.prompt.instruction)))
    }

    /// Sets the number of passages to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the context size budget, in characters.
    pub fn with_max_context_chars(mut self, max_context_chars: Option<usize>) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Ranks the corpus and assembles the context for `query`.
    ///
    /// This is the retrieval half of [`answer`](Self::answer), without any
    /// call to the generator.
    pub async fn retrieve(&self, query: &str) -> Result<Context> {
        let ranked = self.ranker.rank(query, &self.store, self.top_k).await?;
        debug!(
            target: "grounded_core::rag",
            ranker = self.ranker.name(),
            ranked = ranked.len(),
            "Ranked corpus"
        );

        for (i, result) in ranked.iter().enumerate() {
            debug!("Result {}: id={}, score={}", i + 1, result.document.id, result.score);
        }

        Ok(self.assembler.assemble(&ranked, self.max_context_chars))
    }

    /// Answers `query` from the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] when the generation endpoint is
    /// unreachable, and [`RagError::Retrieval`] when the similarity index
    /// fails. A malformed generation response is not an error: the result then
    /// carries an empty answer and a diagnostic in `reasoning`.
    pub async fn answer(&self, query: &str) -> Result<GenerationResult> {
        info!(top_k = self.top_k, ranker = self.ranker.name(), "Answering query");

        let context = self.retrieve(query).await?;
        if context.is_empty() {
            info!("No relevant context found, skipping generation");
            return Ok(GenerationResult {
                prompt: String::new(),
                reasoning: NO_CONTEXT_REASONING.to_string(),
                answer: String::new(),
                relevant_documents: Vec::new(),
            });
        }

        let record = self.prompt_builder.build(query, &context);
        info!(passages = context.len(), chars = context.char_count(), "Context assembled");

        let generation = match self.generator.generate(&record.rendered_prompt).await {
            Ok(generation) => generation,
            Err(GenerationError::MalformedResponse(detail)) => {
                warn!(%detail, "Generation response was malformed");
                return Ok(GenerationResult {
                    prompt: record.rendered_prompt,
                    reasoning: format!("The generation endpoint returned a malformed response: {}", detail),
                    answer: String::new(),
                    relevant_documents: context.passages().to_vec(),
                });
            }
            Err(e) => {
                error!(error = %e, "Generation failed");
                return Err(e.into());
            }
        };

        let Decomposed { reasoning, answer } = decompose(&generation.response);

        let mut relevant_documents = context.passages().to_vec();
        for passage in generation.context {
            if !relevant_documents.contains(&passage) {
                relevant_documents.push(passage);
            }
        }

        Ok(GenerationResult {
            prompt: record.rendered_prompt,
            reasoning,
            answer,
            relevant_documents,
        })
    }
}
