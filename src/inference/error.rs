use std::path::PathBuf;
use thiserror::Error;

/// Failure of the scoring model. Surfaces to clients as a 500.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("scoring model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load scoring model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("forward computation failed: {reason}")]
    ForwardFailed { reason: String },

    #[error("sequence length mismatch: model expects {expected}, got {actual}")]
    SequenceLength { expected: usize, actual: usize },

    #[error("unexpected model output: {reason}")]
    UnexpectedOutput { reason: String },

    #[error("model produced a non-finite confidence ({value})")]
    NonFiniteOutput { value: f32 },

    #[error("inference task aborted: {reason}")]
    Aborted { reason: String },
}

impl From<candle_core::Error> for InferenceError {
    fn from(err: candle_core::Error) -> Self {
        InferenceError::ForwardFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for InferenceError {
    fn from(err: std::io::Error) -> Self {
        InferenceError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
