use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN, REQUIRED_MODEL_FILES};
use crate::embedding::device::DevicePreference;
use crate::embedding::error::EmbeddingError;

/// Default MiniLM output dimension.
pub const MINILM_EMBEDDING_DIM: usize = DEFAULT_EMBEDDING_DIM;

/// Default MiniLM token budget.
pub const MINILM_MAX_SEQ_LEN: usize = DEFAULT_MAX_SEQ_LEN;

/// Configuration for [`MiniLmEmbedder`](super::MiniLmEmbedder).
#[derive(Debug, Clone)]
pub struct MiniLmConfig {
    /// Directory holding `config.json`, `tokenizer.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// Max tokens fed to the encoder.
    pub max_seq_len: usize,
    /// Expected output dimension (checked against the model's hidden size).
    pub embedding_dim: usize,
    /// If true, produce deterministic hashed vectors without model files.
    pub testing_stub: bool,
    /// Compute device for the encoder.
    pub device: DevicePreference,
}

impl Default for MiniLmConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            max_seq_len: MINILM_MAX_SEQ_LEN,
            embedding_dim: MINILM_EMBEDDING_DIM,
            testing_stub: false,
            device: DevicePreference::Auto,
        }
    }
}

impl MiniLmConfig {
    /// Creates a config for a local model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Pins the encoder to `device`.
    pub fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if self.max_seq_len == 0 || self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len and embedding_dim must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the required model files not present in `model_dir`.
    pub fn missing_files(&self) -> Vec<&'static str> {
        missing_model_files(&self.model_dir)
    }

    /// Returns `true` if every required model file exists.
    pub fn model_available(&self) -> bool {
        !self.model_dir.as_os_str().is_empty() && self.missing_files().is_empty()
    }
}

pub(crate) fn missing_model_files(dir: &Path) -> Vec<&'static str> {
    REQUIRED_MODEL_FILES
        .iter()
        .copied()
        .filter(|file| !dir.join(file).is_file())
        .collect()
}
