use serde::{Deserialize, Serialize};

use crate::constants::{EXACT_STRING_SIMILARITY_CUTOFF, HIGH_CONFIDENCE_CUTOFF};

/// How much the verdict should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// `High` above [`HIGH_CONFIDENCE_CUTOFF`], `Medium` above `medium_floor`, else `Low`.
    pub fn grade(similarity: f32, medium_floor: f32) -> Self {
        if similarity > HIGH_CONFIDENCE_CUTOFF {
            Confidence::High
        } else if similarity > medium_floor {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// The tier that actually produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    /// Normalized strings were equal.
    Exact,
    /// Short text scored by edit distance.
    String,
    /// Cosine similarity of backend embeddings.
    Embedding,
    /// Semantic tier failed; edit distance used instead.
    Fallback,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::String => "string",
            MatchMethod::Embedding => "embedding",
            MatchMethod::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one answer check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_correct: bool,
    /// Score in `[0, 1]` from the tier named by `method`.
    pub similarity: f32,
    pub confidence: Confidence,
    pub method: MatchMethod,
    /// Why the semantic tier was abandoned (fallback only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only on [`Verdict::pending`] placeholders; finished verdicts are `false`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checking: bool,
}

impl Verdict {
    /// Normalized texts are identical.
    pub fn exact() -> Self {
        Self {
            is_correct: true,
            similarity: 1.0,
            confidence: Confidence::High,
            method: MatchMethod::Exact,
            error: None,
            checking: false,
        }
    }

    /// Short-text tier verdict from an edit-distance similarity.
    pub fn from_string_similarity(similarity: f32) -> Self {
        Self {
            is_correct: similarity > EXACT_STRING_SIMILARITY_CUTOFF,
            similarity,
            confidence: Confidence::grade(similarity, EXACT_STRING_SIMILARITY_CUTOFF),
            method: MatchMethod::String,
            error: None,
            checking: false,
        }
    }

    /// Semantic tier verdict; raw cosine is clamped into `[0, 1]`.
    pub fn from_embedding_similarity(similarity: f32, threshold: f32) -> Self {
        let similarity = similarity.clamp(0.0, 1.0);
        Self {
            is_correct: similarity >= threshold,
            similarity,
            confidence: Confidence::grade(similarity, threshold),
            method: MatchMethod::Embedding,
            error: None,
            checking: false,
        }
    }

    /// Degraded verdict: edit-distance decision, always low confidence.
    pub fn fallback(similarity: f32, error: impl Into<String>) -> Self {
        Self {
            is_correct: similarity > EXACT_STRING_SIMILARITY_CUTOFF,
            similarity,
            confidence: Confidence::Low,
            method: MatchMethod::Fallback,
            error: Some(error.into()),
            checking: false,
        }
    }

    /// Placeholder a UI shows while a check is in flight.
    ///
    /// Exact and short-text checks finish synchronously, so anything still
    /// pending is waiting on the embedding tier.
    pub fn pending() -> Self {
        Self {
            is_correct: false,
            similarity: 0.0,
            confidence: Confidence::Low,
            method: MatchMethod::Embedding,
            error: None,
            checking: true,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.checking
    }

    pub fn is_degraded(&self) -> bool {
        self.method == MatchMethod::Fallback
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.checking {
            return f.write_str("CHECKING");
        }
        write!(
            f,
            "{} ({}, similarity: {:.4}, confidence: {})",
            if self.is_correct { "CORRECT" } else { "INCORRECT" },
            self.method,
            self.similarity,
            self.confidence.as_str()
        )
    }
}
