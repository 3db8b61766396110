//! MiniLM sentence encoder (BERT + tokenizer, mean pooling).
//!
//! Use [`MiniLmConfig::stub`] for tests/examples without model files.

/// MiniLM configuration.
pub mod config;


pub use config::{MINILM_EMBEDDING_DIM, MINILM_MAX_SEQ_LEN, MiniLmConfig};

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::backend::{BackendLoader, EmbeddingBackend};
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::resolve_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::fetch::ModelFetcher;
use crate::embedding::utils::load_tokenizer;
use crate::similarity::l2_normalize;

#[derive(Clone)]
enum EncoderBackend {
    Model {
        encoder: BertEncoder,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Local sentence encoder (supports stub mode).
pub struct MiniLmEmbedder {
    backend: EncoderBackend,
    config: MiniLmConfig,
}

impl std::fmt::Debug for MiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLmEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl MiniLmEmbedder {
    /// Loads the encoder from a config (blocking; stub mode is supported).
    pub fn load(config: MiniLmConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("MiniLM running in STUB mode (hashed bag-of-words vectors)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        }

        if !config.model_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_dir.clone(),
            });
        }

        let device = resolve_device(config.device)?;
        debug!(?device, preference = %config.device, "Selected compute device for MiniLM");

        let tokenizer = load_tokenizer(&config.model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let encoder = BertEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            }
        })?;

        if encoder.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    encoder.hidden_size()
                ),
            });
        }

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "MiniLM encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    /// Encodes `text` on the current thread.
    pub fn embed_blocking(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => encode_with_model(text, encoder, tokenizer, device, self.config.embedding_dim),
            EncoderBackend::Stub => Ok(stub_embedding(text, self.config.embedding_dim)),
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &MiniLmConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingBackend for MiniLmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => {
                let (encoder, tokenizer, device) =
                    (encoder.clone(), Arc::clone(tokenizer), device.clone());
                let dim = self.config.embedding_dim;
                let text = text.to_string();

                tokio::task::spawn_blocking(move || {
                    encode_with_model(&text, &encoder, &tokenizer, &device, dim)
                })
                .await
                .map_err(|e| EmbeddingError::InferenceFailed {
                    reason: format!("encoder task failed: {}", e),
                })?
            }
            EncoderBackend::Stub => Ok(stub_embedding(text, self.config.embedding_dim)),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn name(&self) -> &str {
        if self.is_stub() { "minilm-stub" } else { "minilm" }
    }
}

fn encode_with_model(
    text: &str,
    encoder: &BertEncoder,
    tokenizer: &Tokenizer,
    device: &Device,
    embedding_dim: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    let encoding =
        tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            })?;

    if encoding.get_ids().is_empty() {
        return Ok(vec![0.0; embedding_dim]);
    }

    debug!(
        text_len = text.len(),
        token_count = encoding.get_ids().len(),
        "Encoding answer text"
    );

    let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
    let token_type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

    let mut embedding = encoder
        .encode_mean_pooled(&input_ids, &token_type_ids, &attention_mask)
        .map_err(|e| EmbeddingError::InferenceFailed {
            reason: format!("Encoder forward pass failed: {}", e),
        })?;

    l2_normalize(&mut embedding);
    Ok(embedding)
}

/// Deterministic hashed bag-of-words vector, L2-normalized.
///
/// Texts sharing words share dimensions, so overlapping answers score higher than
/// unrelated ones. Empty text maps to the zero vector.
pub(crate) fn stub_embedding(text: &str, dim: usize) -> Vec<f32> {
    let mut embedding = vec![0.0f32; dim];
    if dim == 0 {
        return embedding;
    }

    for token in text.split_whitespace() {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();

        let index = (hash % dim as u64) as usize;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        embedding[index] += sign;
    }

    l2_normalize(&mut embedding);
    embedding
}

/// Loads a [`MiniLmEmbedder`], fetching missing model files first when allowed.
#[derive(Debug, Clone)]
pub struct MiniLmLoader {
    config: MiniLmConfig,
    fetcher: Option<ModelFetcher>,
}

impl MiniLmLoader {
    /// Loader that only uses files already on disk.
    pub fn new(config: MiniLmConfig) -> Self {
        Self {
            config,
            fetcher: None,
        }
    }

    /// Loader that downloads missing files with `fetcher` before loading.
    pub fn with_fetcher(config: MiniLmConfig, fetcher: ModelFetcher) -> Self {
        Self {
            config,
            fetcher: Some(fetcher),
        }
    }

    pub fn config(&self) -> &MiniLmConfig {
        &self.config
    }
}

#[async_trait]
impl BackendLoader for MiniLmLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError> {
        self.config.validate()?;

        if !self.config.testing_stub && !self.config.model_available() {
            match &self.fetcher {
                Some(fetcher) => {
                    fetcher.ensure_model_files(&self.config.model_dir).await?;
                }
                None => {
                    return Err(EmbeddingError::DownloadDisabled {
                        path: self.config.model_dir.clone(),
                    });
                }
            }
        }

        let config = self.config.clone();
        let embedder = tokio::task::spawn_blocking(move || MiniLmEmbedder::load(config))
            .await
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("loader task failed: {}", e),
            })??;

        Ok(Arc::new(embedder))
    }

    fn describe(&self) -> String {
        if self.config.testing_stub {
            "minilm (stub)".to_string()
        } else {
            format!("minilm ({})", self.config.model_dir.display())
        }
    }
}
