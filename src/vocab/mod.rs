//! Word-to-id vocabulary fixed at training time.
//!
//! The resource is a flat JSON object mapping stemmed, lowercased words to
//! positive integer ids. Id `0` is reserved for unknown words and padding, so
//! an entry claiming it is rejected at load time.

mod error;

pub use error::VocabError;

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::constants::UNKNOWN_TOKEN_ID;

/// Immutable vocabulary shared by every request.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    ids: HashMap<String, u32>,
    max_id: u32,
}

impl VocabularyIndex {
    /// Reads and validates the vocabulary resource at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VocabError> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|source| VocabError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let vocab = Self::from_json_slice(&content)?;

        info!(
            path = %path.display(),
            words = vocab.len(),
            max_id = vocab.max_id(),
            "Vocabulary loaded"
        );

        Ok(vocab)
    }

    /// Parses a JSON object of `word -> id`.
    ///
    /// Ids are read as wide integers first so negative or oversized values
    /// surface as [`VocabError::IdOutOfRange`] instead of a serde type error.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, VocabError> {
        let raw: HashMap<String, i128> =
            serde_json::from_slice(bytes).map_err(|source| VocabError::Parse { source })?;

        let mut ids = HashMap::with_capacity(raw.len());
        for (word, id) in raw {
            let id = u32::try_from(id).map_err(|_| VocabError::IdOutOfRange {
                word: word.clone(),
                id,
            })?;
            ids.insert(word, id);
        }

        Self::from_map(ids)
    }

    /// Builds an index from an in-memory map.
    pub fn from_map(ids: HashMap<String, u32>) -> Result<Self, VocabError> {
        if ids.is_empty() {
            return Err(VocabError::Empty);
        }

        if let Some((word, _)) = ids.iter().find(|(_, id)| **id == 0) {
            return Err(VocabError::ReservedId { word: word.clone() });
        }

        let max_id = ids.values().copied().max().unwrap_or_default();

        Ok(Self { ids, max_id })
    }

    /// Returns the id for `word`, or the unknown id when absent.
    #[inline]
    pub fn lookup(&self, word: &str) -> i64 {
        self.ids
            .get(word)
            .map(|&id| i64::from(id))
            .unwrap_or(UNKNOWN_TOKEN_ID)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Largest id present. The scoring model's embedding table must be larger.
    pub fn max_id(&self) -> u32 {
        self.max_id
    }
}
