use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::error::ComparisonError;
use super::types::Verdict;
use crate::config::{Config, ConfigError};
use crate::constants::{DEFAULT_SEMANTIC_THRESHOLD, SHORT_TEXT_MIN_CHARS};
use crate::embedding::BackendLoader;
use crate::lifecycle::{BackendManager, BackendStatus};
use crate::similarity::{cosine_similarity, normalize_text, string_similarity};

/// Grades free-form answers against a reference answer.
///
/// Tiers, cheapest first:
///
/// | Condition (after normalization) | Method | Correct when |
/// |---|---|---|
/// | texts equal | `exact` | always |
/// | either text shorter than [`SHORT_TEXT_MIN_CHARS`] | `string` | edit similarity > 0.8 |
/// | otherwise | `embedding` | cosine >= threshold |
/// | embedding tier errored | `fallback` | edit similarity > 0.8 |
///
/// Closed-form answers (multiple-choice labels such as `W`/`X`/`Y`/`Z`) should be
/// compared by the caller directly; edit distance between single letters carries
/// no meaning.
pub struct AnswerChecker {
    backend: BackendManager,
    default_threshold: f32,
}

impl std::fmt::Debug for AnswerChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerChecker")
            .field("backend", &self.backend)
            .field("default_threshold", &self.default_threshold)
            .finish()
    }
}

impl AnswerChecker {
    /// Creates a checker whose semantic tier loads its backend through `loader`.
    pub fn new(loader: Arc<dyn BackendLoader>) -> Self {
        Self {
            backend: BackendManager::new(loader),
            default_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }

    /// Builds the backend loader and default threshold from `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.build_loader()).with_default_threshold(config.semantic_threshold))
    }

    /// Threshold used when a call passes `None`.
    pub fn with_default_threshold(mut self, threshold: f32) -> Self {
        self.default_threshold = resolve_threshold(Some(threshold), DEFAULT_SEMANTIC_THRESHOLD);
        self
    }

    pub fn default_threshold(&self) -> f32 {
        self.default_threshold
    }

    pub fn backend(&self) -> &BackendManager {
        &self.backend
    }

    /// Grades `candidate` against `reference`. Always returns a verdict.
    ///
    /// `threshold` only affects the embedding tier. `None` or a non-finite value
    /// selects the default; anything else is clamped to `[0, 1]`.
    #[instrument(
        skip(self, candidate, reference),
        fields(candidate_len = candidate.len(), reference_len = reference.len())
    )]
    pub async fn check_answer(
        &self,
        candidate: &str,
        reference: &str,
        threshold: Option<f32>,
    ) -> Verdict {
        let threshold = resolve_threshold(threshold, self.default_threshold);
        let candidate = normalize_text(candidate);
        let reference = normalize_text(reference);

        if candidate == reference {
            debug!("Exact match after normalization");
            return Verdict::exact();
        }

        if is_short_text(&candidate) || is_short_text(&reference) {
            let verdict = Verdict::from_string_similarity(string_similarity(&candidate, &reference));
            debug!(similarity = verdict.similarity, "Short text, scored by edit distance");
            return verdict;
        }

        match self.semantic_similarity(&candidate, &reference).await {
            Ok(similarity) => {
                let verdict = Verdict::from_embedding_similarity(similarity, threshold);
                debug!(
                    raw_similarity = similarity,
                    threshold,
                    is_correct = verdict.is_correct,
                    "Scored by embedding similarity"
                );
                verdict
            }
            Err(err) => {
                let similarity = string_similarity(&candidate, &reference);
                warn!(
                    error = %err,
                    backend_unavailable = err.is_backend_unavailable(),
                    similarity,
                    "Semantic tier failed, falling back to edit distance"
                );
                Verdict::fallback(similarity, err.to_string())
            }
        }
    }

    /// Loads the backend ahead of the first check; `false` if it is unavailable.
    pub async fn preload_model(&self) -> bool {
        match self.backend.ensure_ready().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "Embedding backend preload failed");
                false
            }
        }
    }

    pub fn is_model_ready(&self) -> bool {
        self.backend.is_ready()
    }

    /// Forgets a cached backend or failure so the next check retries loading.
    pub fn reset_loading_state(&self) {
        self.backend.reset();
    }

    pub fn backend_status(&self) -> BackendStatus {
        self.backend.status()
    }

    async fn semantic_similarity(
        &self,
        candidate: &str,
        reference: &str,
    ) -> Result<f32, ComparisonError> {
        let backend = self.backend.ensure_ready().await?;

        let (left, right) = tokio::try_join!(backend.embed(candidate), backend.embed(reference))?;

        if left.is_empty() || right.is_empty() {
            return Err(ComparisonError::EmptyEmbedding);
        }
        if left.len() != right.len() {
            return Err(ComparisonError::DimensionMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let similarity = cosine_similarity(&left, &right);
        if !similarity.is_finite() {
            return Err(ComparisonError::NonFiniteSimilarity { value: similarity });
        }

        Ok(similarity)
    }
}

/// `None`/NaN/inf pick `default`; finite values are clamped to `[0, 1]`.
pub fn resolve_threshold(requested: Option<f32>, default: f32) -> f32 {
    match requested {
        Some(t) if t.is_finite() => t.clamp(0.0, 1.0),
        _ => default,
    }
}

/// Normalized text too short for embeddings to be meaningful.
pub fn is_short_text(normalized: &str) -> bool {
    normalized.chars().count() < SHORT_TEXT_MIN_CHARS
}
