//! Text to fixed-length id sequence, exactly as the model saw it in training.
//!
//! Order is fixed: whitespace split, ASCII lowercase, stem, vocabulary lookup,
//! then truncate or right-pad with `0`. Any change here silently shifts model
//! inputs away from the training distribution, so the behaviour is pinned by
//! tests rather than by errors.

mod stemmer;


pub use stemmer::{IdentityStemmer, SnowballStemmer, StemmerError, TokenStemmer};

use std::sync::Arc;

use tracing::debug;

use crate::constants::{DEBUG_TOKEN_PREVIEW, UNKNOWN_TOKEN_ID};
use crate::vocab::VocabularyIndex;

/// Ordered token ids of an exact, fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSequence(Vec<i64>);

impl TokenSequence {
    /// Truncates `ids` to `target_length` (dropping the tail) or right-pads it with `0`.
    pub fn from_ids(mut ids: Vec<i64>, target_length: usize) -> Self {
        ids.resize(target_length, UNKNOWN_TOKEN_ID);
        Self(ids)
    }

    pub fn zeros(target_length: usize) -> Self {
        Self(vec![UNKNOWN_TOKEN_ID; target_length])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }

    /// Number of ids that are neither padding nor unknown.
    pub fn known_count(&self) -> usize {
        self.0.iter().filter(|&&id| id != UNKNOWN_TOKEN_ID).count()
    }
}

impl AsRef<[i64]> for TokenSequence {
    fn as_ref(&self) -> &[i64] {
        &self.0
    }
}

/// Whitespace as the training pipeline's C-locale tokenizer saw it.
///
/// Vertical tab is included and non-ASCII whitespace is not, which is why
/// [`str::split_ascii_whitespace`] cannot be used.
#[inline]
pub fn is_token_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Splits raw text into word tokens on [`is_token_separator`].
pub fn split_words(raw_text: &str) -> impl Iterator<Item = &str> {
    raw_text
        .split(is_token_separator)
        .filter(|token| !token.is_empty())
}

/// Stateless preprocessor over shared, read-only vocabulary and stemmer.
#[derive(Clone)]
pub struct Preprocessor {
    vocab: Arc<VocabularyIndex>,
    stemmer: Arc<dyn TokenStemmer>,
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("vocab_words", &self.vocab.len())
            .finish()
    }
}

impl Preprocessor {
    pub fn new(vocab: Arc<VocabularyIndex>, stemmer: Arc<dyn TokenStemmer>) -> Self {
        Self { vocab, stemmer }
    }

    pub fn vocab(&self) -> &VocabularyIndex {
        &self.vocab
    }

    /// Maps one raw token to its vocabulary id.
    pub fn token_id(&self, word: &str) -> i64 {
        let lowered = word.to_ascii_lowercase();
        let stemmed = self.stemmer.stem(&lowered);
        self.vocab.lookup(&stemmed)
    }

    /// Converts `raw_text` into exactly `target_length` ids. Never fails.
    ///
    /// Tokens beyond `target_length` are never stemmed or looked up; they
    /// would be truncated anyway.
    pub fn preprocess(&self, raw_text: &str, target_length: usize) -> TokenSequence {
        let ids: Vec<i64> = split_words(raw_text)
            .take(target_length)
            .map(|word| self.token_id(word))
            .collect();

        let sequence = TokenSequence::from_ids(ids, target_length);

        debug!(
            target_length,
            known = sequence.known_count(),
            head = ?&sequence.as_slice()[..target_length.min(DEBUG_TOKEN_PREVIEW)],
            "Preprocessed text"
        );

        sequence
    }
}
