//! Tiered answer verification.
//!
//! [`AnswerChecker::check_answer`] is total: backend failures degrade the result
//! to [`MatchMethod::Fallback`] instead of surfacing as errors. Only the lifecycle
//! operations ([`AnswerChecker::preload_model`]) report backend availability.

pub mod error;
pub mod matcher;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ComparisonError;
pub use matcher::{AnswerChecker, is_short_text, resolve_threshold};
pub use types::{Confidence, MatchMethod, Verdict};
