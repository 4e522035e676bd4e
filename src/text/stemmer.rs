use std::fmt;

use rust_stemmers::{Algorithm, Stemmer};
use thiserror::Error;

/// Reduces a single lowercased word to its root form.
///
/// Implementations must be deterministic and safe to call from many request
/// threads at once.
pub trait TokenStemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

#[derive(Debug, Error)]
pub enum StemmerError {
    #[error("unsupported stemmer language '{language}'")]
    UnsupportedLanguage { language: String },
}

/// Snowball stemmer for a configured language.
pub struct SnowballStemmer {
    stemmer: Stemmer,
    language: &'static str,
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("language", &self.language)
            .finish()
    }
}

impl SnowballStemmer {
    /// Creates a stemmer from a Snowball language name or ISO 639 code
    /// (`"english"`, `"en"`, `"eng"`). Matching is case-insensitive.
    pub fn new(language: &str) -> Result<Self, StemmerError> {
        let (algorithm, name) = resolve_language(language).ok_or_else(|| {
            StemmerError::UnsupportedLanguage {
                language: language.to_string(),
            }
        })?;

        Ok(Self {
            stemmer: Stemmer::create(algorithm),
            language: name,
        })
    }

    pub fn language(&self) -> &'static str {
        self.language
    }
}

impl TokenStemmer for SnowballStemmer {
    #[inline]
    fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}

/// Leaves words untouched. Useful for vocabularies built without stemming.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityStemmer;

impl TokenStemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

fn resolve_language(language: &str) -> Option<(Algorithm, &'static str)> {
    let resolved = match language.trim().to_ascii_lowercase().as_str() {
        "arabic" | "ar" | "ara" => (Algorithm::Arabic, "arabic"),
        "danish" | "da" | "dan" => (Algorithm::Danish, "danish"),
        "dutch" | "nl" | "nld" | "dut" => (Algorithm::Dutch, "dutch"),
        "english" | "en" | "eng" => (Algorithm::English, "english"),
        "finnish" | "fi" | "fin" => (Algorithm::Finnish, "finnish"),
        "french" | "fr" | "fra" | "fre" => (Algorithm::French, "french"),
        "german" | "de" | "deu" | "ger" => (Algorithm::German, "german"),
        "greek" | "el" | "ell" | "gre" => (Algorithm::Greek, "greek"),
        "hungarian" | "hu" | "hun" => (Algorithm::Hungarian, "hungarian"),
        "italian" | "it" | "ita" => (Algorithm::Italian, "italian"),
        "norwegian" | "no" | "nor" => (Algorithm::Norwegian, "norwegian"),
        "portuguese" | "pt" | "por" => (Algorithm::Portuguese, "portuguese"),
        "romanian" | "ro" | "ron" | "rum" => (Algorithm::Romanian, "romanian"),
        "russian" | "ru" | "rus" => (Algorithm::Russian, "russian"),
        "spanish" | "es" | "spa" => (Algorithm::Spanish, "spanish"),
        "swedish" | "sv" | "swe" => (Algorithm::Swedish, "swedish"),
        "tamil" | "ta" | "tam" => (Algorithm::Tamil, "tamil"),
        "turkish" | "tr" | "tur" => (Algorithm::Turkish, "turkish"),
        _ => return None,
    };
    Some(resolved)
}
