//! Fetches model files from a model hub into a local directory.
//!
//! Files resolve at `{remote_host}/{model_id}/resolve/{revision}/{file}`. Each file is
//! written to `{file}.part` and renamed into place, so a crashed download never
//! leaves a truncated file that would look present on the next attempt.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::Client as HttpClient;
use tracing::{debug, info};

use crate::constants::{DEFAULT_MODEL_ID, DEFAULT_MODEL_REVISION, DEFAULT_REMOTE_HOST};
use crate::embedding::error::EmbeddingError;
use crate::embedding::minilm::config::missing_model_files;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Downloads missing model files over HTTP.
#[derive(Debug, Clone)]
pub struct ModelFetcher {
    remote_host: String,
    model_id: String,
    revision: String,
    http: HttpClient,
}

impl Default for ModelFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_HOST, DEFAULT_MODEL_ID, DEFAULT_MODEL_REVISION)
    }
}

impl ModelFetcher {
    pub fn new(
        remote_host: impl Into<String>,
        model_id: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            remote_host: remote_host.into(),
            model_id: model_id.into(),
            revision: revision.into(),
            http: HttpClient::builder()
                .timeout(DOWNLOAD_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
        }
    }

    /// URL a model file is fetched from.
    pub fn file_url(&self, file: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.remote_host.trim_end_matches('/'),
            self.model_id,
            self.revision,
            file
        )
    }

    /// Downloads every required file missing from `dir`; returns how many were fetched.
    pub async fn ensure_model_files(&self, dir: &Path) -> Result<usize, EmbeddingError> {
        let missing = missing_model_files(dir);
        if missing.is_empty() {
            debug!(dir = %dir.display(), "Model files already present");
            return Ok(0);
        }

        tokio::fs::create_dir_all(dir).await?;

        info!(
            model_id = %self.model_id,
            revision = %self.revision,
            dir = %dir.display(),
            files = ?missing,
            "Fetching model files"
        );

        for file in &missing {
            self.download(file, dir).await?;
        }

        Ok(missing.len())
    }

    async fn download(&self, file: &str, dir: &Path) -> Result<(), EmbeddingError> {
        let url = self.file_url(file);
        let started = Instant::now();
        let failed = |reason: String| EmbeddingError::DownloadFailed {
            url: url.clone(),
            reason,
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(e.to_string()))?;

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

        let partial = dir.join(format!("{file}.part"));
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, dir.join(file)).await?;

        info!(
            file,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model file fetched"
        );

        Ok(())
    }
}
