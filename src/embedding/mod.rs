//! Embedding backends.
//!
//! - [`backend`] defines the contract the lifecycle manager consumes.
//! - [`minilm`] is the local candle encoder (with a stub mode).
//! - [`remote`] talks to an OpenAI-compatible embeddings endpoint.
//! - [`fetch`] downloads model files on first use.

/// Backend and loader traits.
pub mod backend;
/// BERT encoder wrapper used by MiniLM.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Model file download.
pub mod fetch;
/// Local MiniLM sentence encoder.
pub mod minilm;
/// HTTP embedding service.
pub mod remote;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{BackendLoader, EmbeddingBackend};
pub use device::{DevicePreference, resolve_device};
pub use error::EmbeddingError;
pub use fetch::ModelFetcher;
pub use minilm::{MINILM_EMBEDDING_DIM, MINILM_MAX_SEQ_LEN, MiniLmConfig, MiniLmEmbedder, MiniLmLoader};
pub use remote::{RemoteConfig, RemoteEmbedder, RemoteLoader};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbedder, MockLoader};
