//! Cross-cutting, shared constants.
//!
//! The metadata values are what `GET /` reports; clients key on them, so
//! keep them stable across patch releases.

/// Author reported by the metadata endpoint.
pub const APP_AUTHOR: &str = "doddy-s";

/// Version reported by the metadata endpoint.
pub const APP_VERSION: &str = "v0.1";

/// Application name reported by the metadata endpoint.
pub const APP_NAME: &str = "BlockTheTweet Inference";

/// Default fixed sequence length fed to the scoring model.
///
/// This is a property of the trained model. Deployments with a different
/// model override it through configuration.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 295;

/// Reserved id for out-of-vocabulary words and right padding.
pub const UNKNOWN_TOKEN_ID: i64 = 0;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default Snowball stemmer language.
pub const DEFAULT_STEMMER_LANGUAGE: &str = "english";

/// Number of leading token ids included in preprocessing debug logs.
pub const DEBUG_TOKEN_PREVIEW: usize = 10;

/// Records buffered for the prediction log writer before new ones are dropped.
pub const PREDICTION_LOG_QUEUE_CAPACITY: usize = 1024;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// Preflight cache hint in seconds (one day).
pub const CORS_MAX_AGE_SECS: &str = "86400";
