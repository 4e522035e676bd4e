use tracing::debug;

use super::Scorer;
use super::error::InferenceError;
use crate::text::TokenSequence;

/// Deterministic scorer used when no model is loaded.
///
/// Confidence is the fraction of ids that hit the vocabulary, so it moves
/// with the input without any weights. An all-zero sequence scores `0.0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubScorer;

impl Scorer for StubScorer {
    fn score(&self, sequence: &TokenSequence) -> Result<f32, InferenceError> {
        if sequence.is_empty() {
            return Ok(0.0);
        }
        let confidence = sequence.known_count() as f32 / sequence.len() as f32;
        debug!(confidence, "Computed confidence (stub)");
        Ok(confidence)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Scorer whose forward computation always fails.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct FailingScorer {
    reason: String,
}

#[cfg(any(test, feature = "mock"))]
impl FailingScorer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl Default for FailingScorer {
    fn default() -> Self {
        Self::new("simulated model failure")
    }
}

#[cfg(any(test, feature = "mock"))]
impl Scorer for FailingScorer {
    fn score(&self, _sequence: &TokenSequence) -> Result<f32, InferenceError> {
        Err(InferenceError::ForwardFailed {
            reason: self.reason.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
