//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `BLOCKTWEET_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_PORT, DEFAULT_SEQUENCE_LENGTH, DEFAULT_STEMMER_LANGUAGE};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BLOCKTWEET_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `3000`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Model directory holding `config.json` and `model.safetensors`. Default: `./model`.
    pub model_path: PathBuf,

    /// Vocabulary resource (JSON object, word to id). Default: `./word-index.json`.
    pub vocab_path: PathBuf,

    /// Snowball stemmer language name or ISO code. Default: `english`.
    pub stemmer_language: String,

    /// Fixed token sequence length the model was trained with. Default: `295`.
    pub sequence_length: usize,

    /// Append-only JSONL prediction log. Disabled when unset.
    pub prediction_log: Option<PathBuf>,

    /// Serve with the deterministic stub scorer instead of loading a model.
    pub stub_model: bool,

    /// Serialize forward calls even when the scorer reports itself concurrent-safe.
    pub serialize_inference: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
            model_path: PathBuf::from("./model"),
            vocab_path: PathBuf::from("./word-index.json"),
            stemmer_language: DEFAULT_STEMMER_LANGUAGE.to_string(),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            prediction_log: None,
            stub_model: false,
            serialize_inference: false,
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "BLOCKTWEET_PORT";
    const ENV_BIND_ADDR: &'static str = "BLOCKTWEET_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "BLOCKTWEET_MODEL_PATH";
    const ENV_VOCAB_PATH: &'static str = "BLOCKTWEET_VOCAB_PATH";
    const ENV_STEMMER_LANGUAGE: &'static str = "BLOCKTWEET_STEMMER_LANGUAGE";
    const ENV_SEQUENCE_LENGTH: &'static str = "BLOCKTWEET_SEQUENCE_LENGTH";
    const ENV_PREDICTION_LOG: &'static str = "BLOCKTWEET_PREDICTION_LOG";
    const ENV_STUB_MODEL: &'static str = "BLOCKTWEET_STUB_MODEL";
    const ENV_SERIALIZE_INFERENCE: &'static str = "BLOCKTWEET_SERIALIZE_INFERENCE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_path_from_env(Self::ENV_MODEL_PATH, defaults.model_path);
        let vocab_path = Self::parse_path_from_env(Self::ENV_VOCAB_PATH, defaults.vocab_path);
        let stemmer_language =
            Self::parse_string_from_env(Self::ENV_STEMMER_LANGUAGE, defaults.stemmer_language);
        let sequence_length = Self::parse_sequence_length_from_env(defaults.sequence_length)?;
        let prediction_log = Self::parse_optional_path_from_env(Self::ENV_PREDICTION_LOG);
        let stub_model = Self::parse_flag_from_env(Self::ENV_STUB_MODEL);
        let serialize_inference = Self::parse_flag_from_env(Self::ENV_SERIALIZE_INFERENCE);

        Ok(Self {
            port,
            bind_addr,
            model_path,
            vocab_path,
            stemmer_language,
            sequence_length,
            prediction_log,
            stub_model,
            serialize_inference,
        })
    }

    /// Validates paths and basic invariants (does not create files).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence_length == 0 {
            return Err(ConfigError::InvalidSequenceLength {
                value: self.sequence_length.to_string(),
            });
        }

        if !self.vocab_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.vocab_path.clone(),
            });
        }
        if !self.vocab_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.vocab_path.clone(),
            });
        }

        if !self.stub_model {
            if !self.model_path.exists() {
                return Err(ConfigError::PathNotFound {
                    path: self.model_path.clone(),
                });
            }
            if !self.model_path.is_dir() {
                return Err(ConfigError::NotADirectory {
                    path: self.model_path.clone(),
                });
            }
        }

        if let Some(ref path) = self.prediction_log
            && path.is_dir()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_sequence_length_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_SEQUENCE_LENGTH) {
            Ok(value) => {
                let length: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::SequenceLengthParseError {
                            value: value.clone(),
                            source: e,
                        })?;

                if length == 0 {
                    return Err(ConfigError::InvalidSequenceLength { value });
                }

                Ok(length)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_flag_from_env(var_name: &str) -> bool {
        env::var(var_name).is_ok_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}
