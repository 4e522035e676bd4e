use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("failed to read vocabulary at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vocabulary: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("vocabulary entry '{word}' uses reserved id 0")]
    ReservedId { word: String },

    #[error("vocabulary entry '{word}' has id {id}, expected a positive 32-bit integer")]
    IdOutOfRange { word: String, id: i128 },

    #[error("vocabulary is empty")]
    Empty,
}
