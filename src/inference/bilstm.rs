//! Bidirectional LSTM text classifier on candle.
//!
//! Model directory layout:
//!
//! ```text
//! model/
//!   config.json        {"vocab_size", "embedding_dim", "hidden_size", "sequence_length"}
//!   model.safetensors  embedding.weight
//!                      lstm_forward.{weight_ih_l0, weight_hh_l0, bias_ih_l0, bias_hh_l0}
//!                      lstm_backward.{weight_ih_l0, weight_hh_l0, bias_ih_l0, bias_hh_l0}
//!                      classifier.{weight, bias}
//! ```
//!
//! The LSTM tensors use PyTorch's `nn.LSTM` names, so an exported checkpoint
//! only needs its `*_reverse` tensors moved under `lstm_backward`.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::rnn::{LSTM, LSTMConfig, RNN};
use candle_nn::{Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Scorer;
use super::error::InferenceError;
use crate::text::TokenSequence;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiLstmConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_size: usize,
    pub sequence_length: usize,
}

impl BiLstmConfig {
    pub fn validate(&self) -> Result<(), InferenceError> {
        let fields = [
            ("vocab_size", self.vocab_size),
            ("embedding_dim", self.embedding_dim),
            ("hidden_size", self.hidden_size),
            ("sequence_length", self.sequence_length),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(InferenceError::InvalidConfig {
                reason: format!("{name} must be positive"),
            });
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| InferenceError::InvalidConfig {
                reason: format!("failed to parse {}: {e}", path.as_ref().display()),
            })?;
        config.validate()?;
        Ok(config)
    }
}

pub struct BiLstmScorer {
    embedding: Embedding,
    forward_lstm: LSTM,
    backward_lstm: LSTM,
    classifier: Linear,
    reverse_index: Tensor,
    config: BiLstmConfig,
    device: Device,
}

impl std::fmt::Debug for BiLstmScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiLstmScorer")
            .field("config", &self.config)
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl BiLstmScorer {
    /// Loads `config.json` and `model.safetensors` from `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self, InferenceError> {
        let model_dir = model_dir.as_ref();
        if !model_dir.is_dir() {
            return Err(InferenceError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let config_path = model_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(InferenceError::ModelLoadFailed {
                reason: format!("missing {CONFIG_FILE} in {}", model_dir.display()),
            });
        }

        let weights_path = model_dir.join(WEIGHTS_FILE);
        if !weights_path.exists() {
            return Err(InferenceError::ModelLoadFailed {
                reason: format!("missing {WEIGHTS_FILE} in {}", model_dir.display()),
            });
        }

        let config = BiLstmConfig::load(&config_path)?;

        // SAFETY: the weights file is not modified while the server is running.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
        }
        .map_err(|e| InferenceError::ModelLoadFailed {
            reason: format!("failed to map weights: {e}"),
        })?;

        let scorer =
            Self::from_var_builder(vb, config, device).map_err(|e| match e {
                InferenceError::ForwardFailed { reason } => {
                    InferenceError::ModelLoadFailed { reason }
                }
                other => other,
            })?;

        info!(
            model_dir = %model_dir.display(),
            vocab_size = config.vocab_size,
            embedding_dim = config.embedding_dim,
            hidden_size = config.hidden_size,
            sequence_length = config.sequence_length,
            "BiLSTM scorer loaded"
        );

        Ok(scorer)
    }

    /// Builds the network from any variable source (safetensors, zeros, a `VarMap`).
    pub fn from_var_builder(
        vb: VarBuilder,
        config: BiLstmConfig,
        device: &Device,
    ) -> Result<Self, InferenceError> {
        config.validate()?;

        let embedding = candle_nn::embedding(
            config.vocab_size,
            config.embedding_dim,
            vb.pp("embedding"),
        )?;
        let forward_lstm = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_size,
            lstm_config(),
            vb.pp("lstm_forward"),
        )?;
        let backward_lstm = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_size,
            lstm_config(),
            vb.pp("lstm_backward"),
        )?;
        let classifier = candle_nn::linear(2 * config.hidden_size, 1, vb.pp("classifier"))?;

        let reversed: Vec<u32> = (0..config.sequence_length as u32).rev().collect();
        let reverse_index = Tensor::new(reversed.as_slice(), device)?;

        Ok(Self {
            embedding,
            forward_lstm,
            backward_lstm,
            classifier,
            reverse_index,
            config,
            device: device.clone(),
        })
    }

    pub fn config(&self) -> &BiLstmConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, sequence: &TokenSequence) -> Result<f32, InferenceError> {
        // [1, L]
        let input_ids = Tensor::new(sequence.as_slice(), &self.device)?.unsqueeze(0)?;
        // [1, L, E]
        let embedded = self.embedding.forward(&input_ids)?;

        let forward_states = self.forward_lstm.seq(&embedded)?;
        let reversed = embedded.index_select(&self.reverse_index, 1)?;
        let backward_states = self.backward_lstm.seq(&reversed)?;

        let (Some(forward_last), Some(backward_last)) =
            (forward_states.last(), backward_states.last())
        else {
            return Err(InferenceError::UnexpectedOutput {
                reason: "LSTM produced no hidden states".to_string(),
            });
        };

        // [1, 2H]
        let features = Tensor::cat(&[forward_last.h(), backward_last.h()], 1)?;
        let logits = self.classifier.forward(&features)?;
        let probabilities = candle_nn::ops::sigmoid(&logits)?;

        let values = probabilities.flatten_all()?.to_vec1::<f32>()?;
        match values.as_slice() {
            [confidence] => Ok(*confidence),
            other => Err(InferenceError::UnexpectedOutput {
                reason: format!("expected a single scalar, got {} values", other.len()),
            }),
        }
    }
}

fn lstm_config() -> LSTMConfig {
    LSTMConfig {
        layer_idx: 0,
        ..Default::default()
    }
}

impl Scorer for BiLstmScorer {
    fn score(&self, sequence: &TokenSequence) -> Result<f32, InferenceError> {
        if sequence.len() != self.config.sequence_length {
            return Err(InferenceError::SequenceLength {
                expected: self.config.sequence_length,
                actual: sequence.len(),
            });
        }
        self.forward(sequence)
    }

    /// Tensors are immutable after load; CPU forward passes share nothing mutable.
    /// GPU backends are serialized conservatively.
    fn is_concurrent_safe(&self) -> bool {
        self.device.is_cpu()
    }

    fn name(&self) -> &'static str {
        "bilstm"
    }
}
