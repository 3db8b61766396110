//! Answer verification library crate (used by the CLI and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`AnswerChecker`] - tiered grading facade
//! - [`Verdict`], [`Confidence`], [`MatchMethod`] - grading outcome
//! - [`Config`], [`ConfigError`] - environment configuration
//!
//! ## Embedding
//! - [`EmbeddingBackend`], [`BackendLoader`] - backend contract
//! - [`MiniLmEmbedder`], [`MiniLmLoader`] - local candle encoder
//! - [`RemoteEmbedder`], [`RemoteLoader`] - OpenAI-compatible service
//!
//! ## Lifecycle
//! - [`BackendManager`], [`BackendStatus`], [`LifecycleError`] - lazy single-flight loading
//!
//! ## Utilities
//! - Text normalization, edit distance and cosine similarity in [`similarity`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod lifecycle;
pub mod similarity;
pub mod verify;

pub use config::{BackendKind, Config, ConfigError};
pub use constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_SEMANTIC_THRESHOLD, EXACT_STRING_SIMILARITY_CUTOFF,
    HIGH_CONFIDENCE_CUTOFF, SHORT_TEXT_MIN_CHARS,
};
pub use embedding::{
    BackendLoader, EmbeddingBackend, EmbeddingError, MiniLmConfig, MiniLmEmbedder, MiniLmLoader,
    ModelFetcher, RemoteConfig, RemoteEmbedder, RemoteLoader,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockEmbedder, MockLoader};
pub use lifecycle::{BackendManager, BackendStatus, LifecycleError, LifecycleResult};
pub use similarity::{cosine_similarity, levenshtein_distance, normalize_text, string_similarity};
pub use verify::{AnswerChecker, ComparisonError, Confidence, MatchMethod, Verdict};
