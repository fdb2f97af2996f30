use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the whole retrieval-and-answer pipeline.
///
/// Every section falls back to its defaults when omitted from the YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Configuration for the generative model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

/// Configuration for the embedding model used by the index-backed strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
}

/// Ranking strategy used to select passages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    /// TF-IDF vectors over a vocabulary built from the corpus
    #[default]
    Lexical,
    /// Nearest-neighbor search over document embeddings
    Embedding,
}

/// Configuration for passage retrieval and context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub strategy: RankingStrategy,
    /// Number of passages to retrieve
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Upper bound on the rendered context size, in characters
    #[serde(default)]
    pub max_context_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub instruction: String,
}

fn default_top_k() -> usize {
    15
}

fn default_temperature() -> f64 {
    0.6
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-r1:1.5b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: default_temperature(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RankingStrategy::default(),
            top_k: default_top_k(),
            max_context_chars: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            instruction: crate::rag::prompt::DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }
}
