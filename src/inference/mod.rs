//! Scoring model boundary.
//!
//! [`Scorer`] is the capability the rest of the crate sees; [`InferenceAdapter`]
//! wraps one with latency measurement and, for scorers that are not safe to
//! call concurrently, a lock around the forward call only.

pub mod bilstm;
pub mod device;
mod error;
mod stub;

#[cfg(test)]
mod tests;

pub use bilstm::{BiLstmConfig, BiLstmScorer};
pub use device::select_device;
pub use error::InferenceError;
#[cfg(any(test, feature = "mock"))]
pub use stub::FailingScorer;
pub use stub::StubScorer;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::text::TokenSequence;

/// A pretrained scoring model.
pub trait Scorer: Send + Sync {
    /// Runs the forward computation and returns the scalar output.
    fn score(&self, sequence: &TokenSequence) -> Result<f32, InferenceError>;

    /// Whether `score` may run on several threads at once.
    ///
    /// When `false`, [`InferenceAdapter`] serializes calls.
    fn is_concurrent_safe(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}

/// Output of a single successful forward computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub confidence: f32,
    /// Wall-clock time of the forward call alone, in nanoseconds.
    pub latency_ns: i64,
}

pub struct InferenceAdapter {
    scorer: Arc<dyn Scorer>,
    forward_lock: Option<Mutex<()>>,
}

impl std::fmt::Debug for InferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceAdapter")
            .field("scorer", &self.scorer.name())
            .field("serialized", &self.is_serialized())
            .finish()
    }
}

impl InferenceAdapter {
    /// Wraps `scorer`, serializing only if it reports itself unsafe for concurrent use.
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self::with_serialization(scorer, false)
    }

    /// Wraps `scorer`; `force_serialize` adds the lock even for concurrent-safe scorers.
    pub fn with_serialization(scorer: Arc<dyn Scorer>, force_serialize: bool) -> Self {
        let serialize = force_serialize || !scorer.is_concurrent_safe();
        Self {
            scorer,
            forward_lock: serialize.then(|| Mutex::new(())),
        }
    }

    pub fn is_serialized(&self) -> bool {
        self.forward_lock.is_some()
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Scores `sequence`, timing the forward call only (lock wait excluded).
    pub fn infer(&self, sequence: &TokenSequence) -> Result<Inference, InferenceError> {
        let guard = self.forward_lock.as_ref().map(|lock| lock.lock());

        let started = Instant::now();
        let outcome = self.scorer.score(sequence);
        let elapsed = started.elapsed();

        drop(guard);

        let confidence = outcome?;
        if !confidence.is_finite() {
            return Err(InferenceError::NonFiniteOutput { value: confidence });
        }

        let latency_ns = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);

        debug!(
            scorer = self.scorer.name(),
            confidence,
            latency_ns,
            "Forward computation complete"
        );

        Ok(Inference {
            confidence,
            latency_ns,
        })
    }
}
