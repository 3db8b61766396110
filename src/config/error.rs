//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `ANSWER_BACKEND` named a backend that does not exist.
    #[error("unknown backend '{value}': expected minilm, remote or stub")]
    UnknownBackend { value: String },

    /// Threshold string could not be parsed as a number.
    #[error("failed to parse semantic threshold '{value}': {source}")]
    ThresholdParseError {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Threshold parsed but lies outside `[0, 1]`.
    #[error("invalid semantic threshold {value}: must be between 0 and 1")]
    ThresholdOutOfRange { value: f32 },

    /// `ANSWER_DEVICE` named an unknown compute device.
    #[error("unknown device '{value}': expected auto, cpu, metal or cuda")]
    InvalidDevice { value: String },

    /// Boolean flag held something other than true/false/1/0.
    #[error("invalid boolean for {name}: '{value}'")]
    InvalidBool { name: &'static str, value: String },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
