use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::lifecycle::LifecycleError;

/// Anything that stops the semantic tier from producing a similarity.
///
/// Never escapes [`AnswerChecker::check_answer`](super::AnswerChecker::check_answer);
/// it is rendered into the fallback verdict's `error` field.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error(transparent)]
    Backend(#[from] LifecycleError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("backend returned an empty embedding")]
    EmptyEmbedding,

    #[error("similarity is not a finite number: {value}")]
    NonFiniteSimilarity { value: f32 },
}

impl ComparisonError {
    /// `true` when the backend could not be obtained at all.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, ComparisonError::Backend(err) if err.is_backend_unavailable())
    }
}
