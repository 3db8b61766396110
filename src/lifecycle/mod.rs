//! Lazy, single-flight lifecycle for the embedding backend.
//!
//! The matcher never builds a backend itself; it asks [`BackendManager::ensure_ready`]
//! and treats any error as "semantic tier unavailable".

pub mod error;
pub mod manager;
pub mod types;


pub use error::{LifecycleError, LifecycleResult};
pub use manager::BackendManager;
pub use types::BackendStatus;
