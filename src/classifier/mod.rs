//! Single-request orchestration: fingerprint, preprocess, score.
//!
//! [`Classifier`] holds only shared read-only collaborators, so one instance
//! serves every request concurrently.


use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::hashing::fingerprint;
use crate::inference::{InferenceAdapter, InferenceError, Scorer};
use crate::text::{Preprocessor, TokenSequence};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("inference failed: {0}")]
    InferenceFailure(#[from] InferenceError),
}

/// Result of classifying one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub raw_text: String,
    pub content_hash: u64,
    pub confidence: f32,
    pub latency_ns: i64,
}

pub struct Classifier {
    preprocessor: Preprocessor,
    adapter: InferenceAdapter,
    sequence_length: usize,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("preprocessor", &self.preprocessor)
            .field("adapter", &self.adapter)
            .field("sequence_length", &self.sequence_length)
            .finish()
    }
}

impl Classifier {
    pub fn new(
        preprocessor: Preprocessor,
        adapter: InferenceAdapter,
        sequence_length: usize,
    ) -> Self {
        Self {
            preprocessor,
            adapter,
            sequence_length,
        }
    }

    /// Convenience constructor wrapping `scorer` in a default [`InferenceAdapter`].
    pub fn with_scorer(
        preprocessor: Preprocessor,
        scorer: Arc<dyn Scorer>,
        sequence_length: usize,
    ) -> Self {
        Self::new(preprocessor, InferenceAdapter::new(scorer), sequence_length)
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    /// Encodes `raw_text` at the deployment's fixed length.
    pub fn encode(&self, raw_text: &str) -> TokenSequence {
        self.preprocessor.preprocess(raw_text, self.sequence_length)
    }

    /// Classifies `raw_text`. Blocking and CPU-bound; call from a blocking context.
    ///
    /// Empty text is still scored (as an all-padding sequence).
    #[instrument(skip(self, raw_text), fields(text_len = raw_text.len()))]
    pub fn classify(&self, raw_text: &str) -> Result<Prediction, ClassifyError> {
        let content_hash = fingerprint(raw_text);
        let sequence = self.encode(raw_text);
        let inference = self.adapter.infer(&sequence)?;

        debug!(
            content_hash,
            confidence = inference.confidence,
            latency_ns = inference.latency_ns,
            "Classified text"
        );

        Ok(Prediction {
            raw_text: raw_text.to_string(),
            content_hash,
            confidence: inference.confidence,
            latency_ns: inference.latency_ns,
        })
    }
}
