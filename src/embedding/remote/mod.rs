//! OpenAI-compatible embedding service backend (LM Studio, llama.cpp server, ...).
//!
//! Posts `{"model", "input"}` to `{base_url}/v1/embeddings` and reads
//! `data[0].embedding`. Vectors are re-normalized locally because services differ
//! on whether they normalize.


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::backend::{BackendLoader, EmbeddingBackend};
use crate::embedding::error::EmbeddingError;
use crate::similarity::l2_normalize;

/// Default base URL (LM Studio's local server).
pub const DEFAULT_EMBEDDINGS_URL: &str = "http://localhost:1234";
/// Default model name sent to the service.
pub const DEFAULT_EMBEDDINGS_MODEL: &str = "local-model";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TEXT: &str = "probe";

/// Where the embedding service lives.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMBEDDINGS_URL.to_string(),
            model: DEFAULT_EMBEDDINGS_MODEL.to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Full embeddings endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Embedding backend backed by an HTTP service.
#[derive(Debug)]
pub struct RemoteEmbedder {
    config: RemoteConfig,
    http: HttpClient,
    embedding_dim: usize,
}

impl RemoteEmbedder {
    async fn request(
        http: &HttpClient,
        config: &RemoteConfig,
        text: &str,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &config.model,
            input: text,
        };

        let response: EmbeddingResponse = http
            .post(config.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut embedding = response
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| EmbeddingError::RemoteFailed {
                reason: "response contained no embedding".to_string(),
            })?;

        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingBackend for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(text_len = text.len(), "Requesting remote embedding");
        let embedding = Self::request(&self.http, &self.config, text).await?;

        if embedding.len() != self.embedding_dim {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "service returned {} dims, expected {}",
                    embedding.len(),
                    self.embedding_dim
                ),
            });
        }

        Ok(embedding)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Probes the service once and fixes the embedding dimension from the reply.
#[derive(Debug, Clone)]
pub struct RemoteLoader {
    config: RemoteConfig,
}

impl RemoteLoader {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendLoader for RemoteLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError> {
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        let probe = RemoteEmbedder::request(&http, &self.config, PROBE_TEXT).await?;

        info!(
            endpoint = %self.config.endpoint(),
            model = %self.config.model,
            embedding_dim = probe.len(),
            "Embedding service reachable"
        );

        Ok(Arc::new(RemoteEmbedder {
            config: self.config.clone(),
            http,
            embedding_dim: probe.len(),
        }))
    }

    fn describe(&self) -> String {
        format!("remote ({})", self.config.endpoint())
    }
}
