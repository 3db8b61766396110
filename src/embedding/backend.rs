//! The contract between the lifecycle manager and concrete embedding backends.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::EmbeddingError;

#[async_trait]
/// A ready-to-use text encoder.
///
/// Implementations must be deterministic for identical input and return
/// L2-normalized vectors of [`embedding_dim`](EmbeddingBackend::embedding_dim) length.
pub trait EmbeddingBackend: Send + Sync {
    /// Encodes `text` into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    /// Output vector length.
    fn embedding_dim(&self) -> usize;
    /// Short label used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
/// Performs the expensive, one-off construction of an [`EmbeddingBackend`].
///
/// The lifecycle manager calls [`load`](BackendLoader::load) at most once per attempt;
/// loaders themselves do not cache.
pub trait BackendLoader: Send + Sync {
    /// Builds a backend (may download files, read weights, or probe a service).
    async fn load(&self) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError>;
    /// Human-readable description of what will be loaded.
    fn describe(&self) -> String;
}
