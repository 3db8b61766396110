use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::{LifecycleError, LifecycleResult};
use super::types::BackendStatus;
use crate::embedding::{BackendLoader, EmbeddingBackend};

type LoadOutcome = Result<Arc<dyn EmbeddingBackend>, String>;
type PendingLoad = Shared<BoxFuture<'static, LoadOutcome>>;

enum BackendState {
    Uninitialized,
    Loading { attempt: u64, pending: PendingLoad },
    Ready(Arc<dyn EmbeddingBackend>),
    Failed { reason: String },
}

impl BackendState {
    fn status(&self) -> BackendStatus {
        match self {
            BackendState::Uninitialized => BackendStatus::Uninitialized,
            BackendState::Loading { .. } => BackendStatus::Loading,
            BackendState::Ready(_) => BackendStatus::Ready,
            BackendState::Failed { .. } => BackendStatus::Failed,
        }
    }
}

/// Owns the single embedding backend and its load state.
///
/// `Uninitialized -> Loading -> Ready | Failed`. Concurrent callers arriving while
/// `Loading` await the same attempt. `Failed` is sticky until [`reset`](Self::reset).
///
/// Load attempts run on a spawned task, so they finish even if every caller stops
/// waiting. `reset()` does not cancel an attempt in flight: callers already waiting
/// on it still receive its outcome, but the outcome is discarded instead of being
/// cached, and the next `ensure_ready()` starts a fresh attempt.
pub struct BackendManager {
    loader: Arc<dyn BackendLoader>,
    state: Arc<Mutex<BackendState>>,
    attempts: AtomicU64,
}

impl std::fmt::Debug for BackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendManager")
            .field("loader", &self.loader.describe())
            .field("status", &self.status())
            .field("attempts", &self.attempt_count())
            .finish()
    }
}

impl BackendManager {
    pub fn new(loader: Arc<dyn BackendLoader>) -> Self {
        Self {
            loader,
            state: Arc::new(Mutex::new(BackendState::Uninitialized)),
            attempts: AtomicU64::new(0),
        }
    }

    /// Returns the ready backend, loading it on first use.
    ///
    /// Fails with [`LifecycleError::BackendUnavailable`] when the awaited attempt
    /// fails, and with [`LifecycleError::PreviouslyFailed`] without retrying when
    /// an earlier attempt already failed.
    pub async fn ensure_ready(&self) -> LifecycleResult<Arc<dyn EmbeddingBackend>> {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                BackendState::Ready(backend) => return Ok(Arc::clone(backend)),
                BackendState::Failed { reason } => {
                    return Err(LifecycleError::PreviouslyFailed {
                        reason: reason.clone(),
                    });
                }
                BackendState::Loading { attempt, pending } => {
                    debug!(attempt, "Joining in-flight backend load");
                    pending.clone()
                }
                BackendState::Uninitialized => {
                    // Ids are only handed out under the state lock, so the counter itself
                    // needs no ordering beyond atomicity.
                    let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                    let pending = self.start_attempt(attempt);
                    *state = BackendState::Loading {
                        attempt,
                        pending: pending.clone(),
                    };
                    pending
                }
            }
        };

        pending
            .await
            .map_err(|reason| LifecycleError::BackendUnavailable { reason })
    }

    /// Non-blocking: `true` only when a backend is cached.
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock(), BackendState::Ready(_))
    }

    pub fn status(&self) -> BackendStatus {
        self.state.lock().status()
    }

    /// Total load attempts started since construction.
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Clears any cached backend or failure; the next `ensure_ready()` loads afresh.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let previous = state.status();
        *state = BackendState::Uninitialized;
        warn!(previous = %previous, "Embedding backend state reset");
    }

    fn start_attempt(&self, attempt: u64) -> PendingLoad {
        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn({
            let state = Arc::clone(&state);
            async move {
                let backend = loader.describe();
                let started = Instant::now();
                info!(attempt, backend = %backend, "Loading embedding backend");

                let outcome = loader.load().await.map_err(|e| e.to_string());
                let elapsed_ms = started.elapsed().as_millis() as u64;

                match &outcome {
                    Ok(loaded) => info!(
                        attempt,
                        backend = %backend,
                        name = loaded.name(),
                        embedding_dim = loaded.embedding_dim(),
                        elapsed_ms,
                        "Embedding backend ready"
                    ),
                    Err(reason) => warn!(
                        attempt,
                        backend = %backend,
                        error = %reason,
                        elapsed_ms,
                        "Embedding backend failed to load; not retrying until reset"
                    ),
                }

                settle(&state, attempt, &outcome);
                outcome
            }
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    let outcome: LoadOutcome = Err(format!("load task aborted: {}", join_err));
                    settle(&state, attempt, &outcome);
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Moves `Loading(attempt)` to its terminal state; outcomes of superseded attempts are dropped.
fn settle(state: &Mutex<BackendState>, attempt: u64, outcome: &LoadOutcome) {
    let mut guard = state.lock();
    let current = match &*guard {
        BackendState::Loading { attempt: current, .. } => Some(*current),
        _ => None,
    };

    if current != Some(attempt) {
        debug!(attempt, "Discarding outcome of superseded load attempt");
        return;
    }

    *guard = match outcome {
        Ok(backend) => BackendState::Ready(Arc::clone(backend)),
        Err(reason) => BackendState::Failed {
            reason: reason.clone(),
        },
    };
}
