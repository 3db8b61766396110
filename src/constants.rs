//! Cross-cutting, shared constants.
//!
//! # Tier Boundaries
//!
//! The matcher's decision table is driven entirely by the cutoffs below. They are
//! part of the public contract: callers and tests can reason about where a verdict
//! flips without reading the matcher.
//!
//! | Constant | Used by | Meaning |
//! |---|---|---|
//! | [`EXACT_STRING_SIMILARITY_CUTOFF`] | string + fallback tiers | edit-distance similarity must exceed this to count as correct |
//! | [`HIGH_CONFIDENCE_CUTOFF`] | string + embedding tiers | similarity above this is reported with high confidence |
//! | [`DEFAULT_SEMANTIC_THRESHOLD`] | embedding tier | cosine similarity at or above this is correct (overridable per call) |
//! | [`SHORT_TEXT_MIN_CHARS`] | tier selection | normalized text shorter than this skips the embedding backend |

/// Edit-distance similarity must be strictly greater than this to be correct.
pub const EXACT_STRING_SIMILARITY_CUTOFF: f32 = 0.8;

/// Similarity strictly greater than this yields [`Confidence::High`](crate::verify::Confidence::High).
pub const HIGH_CONFIDENCE_CUTOFF: f32 = 0.9;

/// Default cosine-similarity threshold for the embedding tier.
pub const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.75;

/// Normalized answers with fewer characters than this use string similarity.
pub const SHORT_TEXT_MIN_CHARS: usize = 5;

/// Output dimension of all-MiniLM-L6-v2 (and of the stub backend).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token budget per input; matches the sentence-transformers setting for MiniLM.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Hub repository holding safetensors weights for the default model.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Hub revision used when fetching model files.
pub const DEFAULT_MODEL_REVISION: &str = "main";

/// Hub host used when fetching model files.
pub const DEFAULT_REMOTE_HOST: &str = "https://huggingface.co";

/// Files a local model directory must contain.
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];
