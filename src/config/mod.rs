//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `ANSWER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::constants::{
    DEFAULT_MODEL_ID, DEFAULT_MODEL_REVISION, DEFAULT_REMOTE_HOST, DEFAULT_SEMANTIC_THRESHOLD,
};
use crate::embedding::remote::{DEFAULT_EMBEDDINGS_MODEL, DEFAULT_EMBEDDINGS_URL};
use crate::embedding::{
    BackendLoader, DevicePreference, MiniLmConfig, MiniLmLoader, ModelFetcher, RemoteConfig,
    RemoteLoader,
};

/// Which embedding backend the semantic tier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Local MiniLM encoder (candle).
    #[default]
    MiniLm,
    /// OpenAI-compatible embeddings service.
    Remote,
    /// Deterministic hashed vectors; no model files needed.
    Stub,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::MiniLm => "minilm",
            BackendKind::Remote => "remote",
            BackendKind::Stub => "stub",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minilm" => Ok(BackendKind::MiniLm),
            "remote" => Ok(BackendKind::Remote),
            "stub" => Ok(BackendKind::Stub),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

/// Answer checker configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ANSWER_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Embedding backend. Default: `minilm`.
    pub backend: BackendKind,

    /// Local model directory. Default: `./.models/all-MiniLM-L6-v2`.
    pub model_dir: PathBuf,

    /// Hub repository fetched into `model_dir`.
    pub model_id: String,

    /// Hub revision. Default: `main`.
    pub model_revision: String,

    /// Hub host. Default: `https://huggingface.co`.
    pub remote_host: String,

    /// Fetch missing model files on first load. Default: `true`.
    pub allow_download: bool,

    /// Encoder device (`auto`, `cpu`, `metal`, `cuda`). Default: `auto`.
    pub device: DevicePreference,

    /// Base URL of the embeddings service (remote backend only).
    pub embeddings_url: String,

    /// Model name sent to the embeddings service.
    pub embeddings_model: String,

    /// Threshold used when a check passes none. Default: `0.75`.
    pub semantic_threshold: f32,
}

/// Default model directory used when `ANSWER_MODEL_DIR` is not set.
pub const DEFAULT_MODEL_DIR: &str = "./.models/all-MiniLM-L6-v2";

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_revision: DEFAULT_MODEL_REVISION.to_string(),
            remote_host: DEFAULT_REMOTE_HOST.to_string(),
            allow_download: true,
            device: DevicePreference::Auto,
            embeddings_url: DEFAULT_EMBEDDINGS_URL.to_string(),
            embeddings_model: DEFAULT_EMBEDDINGS_MODEL.to_string(),
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }
}

impl Config {
    const ENV_BACKEND: &'static str = "ANSWER_BACKEND";
    const ENV_MODEL_DIR: &'static str = "ANSWER_MODEL_DIR";
    const ENV_MODEL_ID: &'static str = "ANSWER_MODEL_ID";
    const ENV_MODEL_REVISION: &'static str = "ANSWER_MODEL_REVISION";
    const ENV_REMOTE_HOST: &'static str = "ANSWER_REMOTE_HOST";
    const ENV_ALLOW_DOWNLOAD: &'static str = "ANSWER_ALLOW_DOWNLOAD";
    const ENV_DEVICE: &'static str = "ANSWER_DEVICE";
    const ENV_EMBEDDINGS_URL: &'static str = "ANSWER_EMBEDDINGS_URL";
    const ENV_EMBEDDINGS_MODEL: &'static str = "ANSWER_EMBEDDINGS_MODEL";
    const ENV_SEMANTIC_THRESHOLD: &'static str = "ANSWER_SEMANTIC_THRESHOLD";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend = match Self::read_trimmed(Self::ENV_BACKEND) {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };
        let model_dir = Self::parse_path_from_env(Self::ENV_MODEL_DIR, defaults.model_dir);
        let model_id = Self::parse_string_from_env(Self::ENV_MODEL_ID, defaults.model_id);
        let model_revision =
            Self::parse_string_from_env(Self::ENV_MODEL_REVISION, defaults.model_revision);
        let remote_host = Self::parse_string_from_env(Self::ENV_REMOTE_HOST, defaults.remote_host);
        let allow_download =
            Self::parse_bool_from_env(Self::ENV_ALLOW_DOWNLOAD, defaults.allow_download)?;
        let device = match Self::read_trimmed(Self::ENV_DEVICE) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDevice { value })?,
            None => defaults.device,
        };
        let embeddings_url =
            Self::parse_string_from_env(Self::ENV_EMBEDDINGS_URL, defaults.embeddings_url);
        let embeddings_model =
            Self::parse_string_from_env(Self::ENV_EMBEDDINGS_MODEL, defaults.embeddings_model);
        let semantic_threshold = Self::parse_threshold_from_env(defaults.semantic_threshold)?;

        Ok(Self {
            backend,
            model_dir,
            model_id,
            model_revision,
            remote_host,
            allow_download,
            device,
            embeddings_url,
            embeddings_model,
            semantic_threshold,
        })
    }

    /// Validates the threshold and model directory (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.semantic_threshold.is_finite() || !(0.0..=1.0).contains(&self.semantic_threshold)
        {
            return Err(ConfigError::ThresholdOutOfRange {
                value: self.semantic_threshold,
            });
        }

        if self.backend == BackendKind::MiniLm
            && self.model_dir.exists()
            && !self.model_dir.is_dir()
        {
            return Err(ConfigError::NotADirectory {
                path: self.model_dir.clone(),
            });
        }

        Ok(())
    }

    /// Builds the loader for the configured backend. Nothing is loaded yet.
    pub fn build_loader(&self) -> Arc<dyn BackendLoader> {
        match self.backend {
            BackendKind::MiniLm => {
                let config = MiniLmConfig::new(&self.model_dir).with_device(self.device);
                if self.allow_download {
                    let fetcher = ModelFetcher::new(
                        &self.remote_host,
                        &self.model_id,
                        &self.model_revision,
                    );
                    Arc::new(MiniLmLoader::with_fetcher(config, fetcher))
                } else {
                    Arc::new(MiniLmLoader::new(config))
                }
            }
            BackendKind::Remote => Arc::new(RemoteLoader::new(RemoteConfig::new(
                &self.embeddings_url,
                &self.embeddings_model,
            ))),
            BackendKind::Stub => Arc::new(MiniLmLoader::new(MiniLmConfig::stub())),
        }
    }

    fn read_trimmed(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::read_trimmed(var_name)
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::read_trimmed(var_name).unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = Self::read_trimmed(var_name) else {
            return Ok(default);
        };

        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name: var_name,
                value,
            }),
        }
    }

    fn parse_threshold_from_env(default: f32) -> Result<f32, ConfigError> {
        let Some(value) = Self::read_trimmed(Self::ENV_SEMANTIC_THRESHOLD) else {
            return Ok(default);
        };

        let threshold: f32 = value
            .parse()
            .map_err(|e| ConfigError::ThresholdParseError {
                value: value.clone(),
                source: e,
            })?;

        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange { value: threshold });
        }

        Ok(threshold)
    }
}
