//! BlockTheTweet inference library (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Request path
//! - [`Classifier`], [`Prediction`] - fingerprint, preprocess, score
//! - [`Preprocessor`], [`TokenSequence`] - raw text to fixed-length ids
//! - [`VocabularyIndex`] - word to id lookup (id `0` reserved)
//! - [`fingerprint`] - XXH64 content hash of the raw text
//!
//! ## Scoring
//! - [`Scorer`], [`InferenceAdapter`] - model capability and timed invocation
//! - [`BiLstmScorer`] - bidirectional LSTM on candle
//! - [`StubScorer`] - deterministic scorer for running without weights
//!
//! ## Serving
//! - [`Config`] - environment-backed settings
//! - [`build_service`] - startup wiring
//! - [`create_router_with_state`] - axum router
//! - [`JsonlPredictionLog`] - optional off-path prediction log
//!
//! ## Test/Mock Support
//! [`FailingScorer`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod bootstrap;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod inference;
pub mod sink;
pub mod text;
pub mod vocab;

pub use bootstrap::{Service, StartupError, build_classifier, build_service};
pub use classifier::{ClassifyError, Classifier, Prediction};
pub use config::{Config, ConfigError};
pub use gateway::{AppState, GatewayError, create_router_with_state};
pub use hashing::fingerprint;
#[cfg(any(test, feature = "mock"))]
pub use inference::FailingScorer;
pub use inference::{
    BiLstmConfig, BiLstmScorer, Inference, InferenceAdapter, InferenceError, Scorer, StubScorer,
    select_device,
};
pub use sink::{JsonlPredictionLog, PredictionRecord, PredictionSink, SinkError};
pub use text::{
    IdentityStemmer, Preprocessor, SnowballStemmer, StemmerError, TokenSequence, TokenStemmer,
};
pub use vocab::{VocabError, VocabularyIndex};
