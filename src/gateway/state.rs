use std::sync::Arc;

use crate::classifier::Classifier;
use crate::gateway::payload::AppMetadata;
use crate::sink::PredictionSink;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,

    pub sink: Option<Arc<dyn PredictionSink>>,

    pub metadata: AppMetadata,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self {
            classifier,
            sink: None,
            metadata: AppMetadata::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn PredictionSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("classifier", &self.classifier)
            .field("sink", &self.sink.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}
