//! Startup wiring: from a validated [`Config`] to the shared [`AppState`].
//!
//! Everything here runs once, before the listener is bound. Any failure is a
//! [`StartupError`] and the process exits without serving.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::config::{Config, ConfigError};
use crate::gateway::AppState;
use crate::inference::{
    BiLstmConfig, BiLstmScorer, InferenceAdapter, InferenceError, Scorer, StubScorer,
    select_device,
};
use crate::sink::{JsonlPredictionLog, SinkError};
use crate::text::{Preprocessor, SnowballStemmer, StemmerError};
use crate::vocab::{VocabError, VocabularyIndex};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("vocabulary error: {0}")]
    Vocab(#[from] VocabError),

    #[error("stemmer error: {0}")]
    Stemmer(#[from] StemmerError),

    #[error("model error: {0}")]
    Model(#[from] InferenceError),

    #[error("model does not match deployment: {reason}")]
    ModelMismatch { reason: String },

    #[error("prediction log error: {0}")]
    Sink(#[from] SinkError),
}

/// Shared state plus the background tasks the server must drain on shutdown.
pub struct Service {
    pub state: AppState,
    pub sink_task: Option<JoinHandle<()>>,
}

/// Validates `config` and builds everything the router needs.
pub async fn build_service(config: &Config) -> Result<Service, StartupError> {
    config.validate()?;

    let classifier = Arc::new(build_classifier(config)?);
    let mut state = AppState::new(classifier);

    let sink_task = match &config.prediction_log {
        Some(path) => {
            let (log, task) = JsonlPredictionLog::open(path).await?;
            state = state.with_sink(Arc::new(log));
            Some(task)
        }
        None => None,
    };

    Ok(Service { state, sink_task })
}

/// Loads vocabulary, stemmer and scorer, then assembles the [`Classifier`].
pub fn build_classifier(config: &Config) -> Result<Classifier, StartupError> {
    let vocab = Arc::new(VocabularyIndex::load(&config.vocab_path)?);

    let stemmer = Arc::new(SnowballStemmer::new(&config.stemmer_language)?);
    info!(language = stemmer.language(), "Stemmer ready");

    let scorer: Arc<dyn Scorer> = if config.stub_model {
        warn!("BLOCKTWEET_STUB_MODEL set, serving with the stub scorer");
        Arc::new(StubScorer)
    } else {
        let device = select_device()?;
        let model = BiLstmScorer::load(&config.model_path, &device)?;
        check_model_compatibility(model.config(), &vocab, config.sequence_length)?;
        Arc::new(model)
    };

    let adapter = InferenceAdapter::with_serialization(scorer, config.serialize_inference);
    info!(
        scorer = adapter.scorer_name(),
        serialized = adapter.is_serialized(),
        sequence_length = config.sequence_length,
        "Inference ready"
    );

    Ok(Classifier::new(
        Preprocessor::new(vocab, stemmer),
        adapter,
        config.sequence_length,
    ))
}

/// Rejects a model trained for a different sequence length or a smaller vocabulary.
pub fn check_model_compatibility(
    model: &BiLstmConfig,
    vocab: &VocabularyIndex,
    sequence_length: usize,
) -> Result<(), StartupError> {
    if model.sequence_length != sequence_length {
        return Err(StartupError::ModelMismatch {
            reason: format!(
                "model expects sequence length {}, configured {}",
                model.sequence_length, sequence_length
            ),
        });
    }

    if vocab.max_id() as usize >= model.vocab_size {
        return Err(StartupError::ModelMismatch {
            reason: format!(
                "vocabulary id {} exceeds model vocab_size {}",
                vocab.max_id(),
                model.vocab_size
            ),
        });
    }

    Ok(())
}
