//! Ollama provider implementation.
//!
//! This module provides an Ollama HTTP API client implementing the
//! [`Generator`] and [`Embedder`] traits. Generation uses the non-streaming
//! `/api/generate` endpoint so that one prompt maps to exactly one response.

use super::types::*;
use crate::config::Config;
use async_trait::async_trait;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ollama HTTP API generation client.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    temperature: f64,
    http_client: reqwest::Client,
}

impl OllamaGenerator {
    /// Creates a new generation client from the `llm` section of the config.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            http_client: reqwest::Client::new(),
        }
    }

    /// Replaces the underlying HTTP client, e.g. to set a request timeout.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models installed on the Ollama server.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Unavailable(format!(
                "Ollama returned {}",
                response.status()
            )));
        }

        let tags = response
            .json::<TagsResponse>()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        Ok(tags.models)
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: {
                let mut opts = HashMap::new();
                opts.insert("temperature".to_string(), serde_json::json!(self.temperature));
                Some(opts)
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let response = self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Unavailable(format!("{}: {}", status, error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let ollama_response: OllamaGenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        if !ollama_response.done {
            warn!(model = %self.model, "Ollama returned an incomplete generation");
        }

        Ok(Generation {
            response: ollama_response.response,
            context: text_entries(ollama_response.context),
        })
    }
}

/// Ollama embedding client.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OllamaEmbedder {
    /// Creates a new embedding client using `llm.base_url` and `embedding.model`.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            model: config.embedding.model.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embed", self.base_url);

        let embed_request = EmbedRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let response = self.http_client
            .post(&url)
            .json(&embed_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(EmbedError::Api(error_text));
        }

        let embed_response = response.json::<EmbedResponse>().await?;

        embed_response.embeddings
            .into_iter()
            .next()
            .ok_or(EmbedError::NoEmbeddings)
    }
}

/// Keeps the string entries of Ollama's `context` field.
///
/// Ollama reports token ids there; other backends speaking the same envelope
/// return source passages as strings.
fn text_entries(context: Option<serde_json::Value>) -> Vec<String> {
    match context {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// A model installed on the Ollama server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    context: Option<serde_json::Value>,
    #[serde(default = "default_done")]
    done: bool,
}

fn default_done() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}
