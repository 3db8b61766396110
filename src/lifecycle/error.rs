use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The load attempt this caller waited on failed.
    #[error("embedding backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// An earlier attempt failed; no new attempt is made until `reset()`.
    #[error("embedding backend previously failed ({reason}); requires explicit reset")]
    PreviouslyFailed { reason: String },
}

impl LifecycleError {
    /// Both variants mean "no backend"; they differ only in whether this call attempted a load.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            LifecycleError::BackendUnavailable { .. } | LifecycleError::PreviouslyFailed { .. }
        )
    }

    /// Returns `true` for the sticky, cached failure.
    pub fn is_sticky(&self) -> bool {
        matches!(self, LifecycleError::PreviouslyFailed { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            LifecycleError::BackendUnavailable { reason }
            | LifecycleError::PreviouslyFailed { reason } => reason,
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
