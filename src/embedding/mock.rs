//! Test doubles for the embedding backend and its loader.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{BackendLoader, EmbeddingBackend};
use super::error::EmbeddingError;
use super::minilm::stub_embedding;
use crate::similarity::l2_normalize;

/// Backend returning table-driven vectors, falling back to hashed bag-of-words.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    embedding_dim: usize,
    fail_embeds: AtomicBool,
    embed_calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            ..Default::default()
        }
    }

    /// Returns `vector` (normalized) whenever `text` is embedded.
    pub fn with_vector(mut self, text: &str, mut vector: Vec<f32>) -> Self {
        vector.resize(self.embedding_dim, 0.0);
        l2_normalize(&mut vector);
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Makes every subsequent `embed` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail_embeds.store(failing, Ordering::SeqCst);
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_embeds.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder failure".to_string(),
            });
        }

        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| stub_embedding(text, self.embedding_dim)))
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Loader that counts attempts and can be told to fail or to be slow.
#[derive(Debug)]
pub struct MockLoader {
    embedder: Arc<MockEmbedder>,
    loads: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl MockLoader {
    pub fn new(embedder: MockEmbedder) -> Self {
        Self {
            embedder: Arc::new(embedder),
            loads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    /// A loader whose attempts always fail until [`set_failing(false)`](Self::set_failing).
    pub fn failing(embedder: MockEmbedder) -> Self {
        let loader = Self::new(embedder);
        loader.set_failing(true);
        loader
    }

    /// Sleeps for `delay` inside every load attempt.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times [`BackendLoader::load`] has been entered.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn embedder(&self) -> &Arc<MockEmbedder> {
        &self.embedder
    }
}

#[async_trait]
impl BackendLoader for MockLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: "mock load failure".to_string(),
            });
        }

        Ok(Arc::clone(&self.embedder) as Arc<dyn EmbeddingBackend>)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
