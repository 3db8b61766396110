use serde::Serialize;

/// Observable lifecycle state of the embedding backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl BackendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendStatus::Uninitialized => "uninitialized",
            BackendStatus::Loading => "loading",
            BackendStatus::Ready => "ready",
            BackendStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
