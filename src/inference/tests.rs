use super::*;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};

const TEST_CONFIG: BiLstmConfig = BiLstmConfig {
    vocab_size: 16,
    embedding_dim: 4,
    hidden_size: 3,
    sequence_length: 6,
};

fn zero_tensors(config: &BiLstmConfig, classifier_bias: f32) -> HashMap<String, Tensor> {
    let device = Device::Cpu;
    let h4 = 4 * config.hidden_size;
    let mut tensors = HashMap::new();

    let zeros = |shape: &[usize]| Tensor::zeros(shape, DType::F32, &device).unwrap();

    tensors.insert(
        "embedding.weight".to_string(),
        zeros(&[config.vocab_size, config.embedding_dim]),
    );
    for prefix in ["lstm_forward", "lstm_backward"] {
        tensors.insert(
            format!("{prefix}.weight_ih_l0"),
            zeros(&[h4, config.embedding_dim]),
        );
        tensors.insert(
            format!("{prefix}.weight_hh_l0"),
            zeros(&[h4, config.hidden_size]),
        );
        tensors.insert(format!("{prefix}.bias_ih_l0"), zeros(&[h4]));
        tensors.insert(format!("{prefix}.bias_hh_l0"), zeros(&[h4]));
    }
    tensors.insert(
        "classifier.weight".to_string(),
        zeros(&[1, 2 * config.hidden_size]),
    );
    tensors.insert(
        "classifier.bias".to_string(),
        Tensor::new(&[classifier_bias], &device).unwrap(),
    );
    tensors
}

fn zero_scorer(classifier_bias: f32) -> BiLstmScorer {
    let vb = VarBuilder::from_tensors(
        zero_tensors(&TEST_CONFIG, classifier_bias),
        DType::F32,
        &Device::Cpu,
    );
    BiLstmScorer::from_var_builder(vb, TEST_CONFIG, &Device::Cpu).expect("build scorer")
}

fn write_model_dir(dir: &std::path::Path, config: &BiLstmConfig, classifier_bias: f32) {
    std::fs::write(
        dir.join(bilstm::CONFIG_FILE),
        serde_json::to_vec(config).unwrap(),
    )
    .unwrap();
    candle_core::safetensors::save(
        &zero_tensors(config, classifier_bias),
        dir.join(bilstm::WEIGHTS_FILE),
    )
    .unwrap();
}

/// Tracks the peak number of overlapping `score` calls.
struct OverlapScorer {
    active: AtomicUsize,
    peak: AtomicUsize,
    concurrent_safe: bool,
}

impl OverlapScorer {
    fn new(concurrent_safe: bool) -> Self {
        Self {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            concurrent_safe,
        }
    }
}

impl Scorer for OverlapScorer {
    fn score(&self, _sequence: &TokenSequence) -> Result<f32, InferenceError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(0.25)
    }

    fn is_concurrent_safe(&self) -> bool {
        self.concurrent_safe
    }

    fn name(&self) -> &'static str {
        "overlap"
    }
}

struct ConstantScorer(f32);

impl Scorer for ConstantScorer {
    fn score(&self, _sequence: &TokenSequence) -> Result<f32, InferenceError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

fn run_parallel(adapter: Arc<InferenceAdapter>, threads: usize) {
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let adapter = adapter.clone();
            std::thread::spawn(move || {
                adapter
                    .infer(&TokenSequence::zeros(4))
                    .expect("inference should succeed")
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread should not panic");
    }
}

#[test]
fn test_stub_scorer_fraction_of_known_ids() {
    let scorer = StubScorer;
    let seq = TokenSequence::from_ids(vec![3, 0, 9, 0], 4);
    assert_eq!(scorer.score(&seq).unwrap(), 0.5);
    assert_eq!(scorer.score(&TokenSequence::zeros(34)).unwrap(), 0.0);
    assert_eq!(scorer.score(&TokenSequence::zeros(0)).unwrap(), 0.0);
}

#[test]
fn test_failing_scorer_always_errors() {
    let scorer = FailingScorer::new("boom");
    let err = scorer.score(&TokenSequence::zeros(4)).unwrap_err();
    assert!(matches!(err, InferenceError::ForwardFailed { ref reason } if reason == "boom"));
}

#[test]
fn test_adapter_reports_confidence_and_latency() {
    let adapter = InferenceAdapter::new(Arc::new(ConstantScorer(0.75)));
    let inference = adapter.infer(&TokenSequence::zeros(8)).unwrap();
    assert_eq!(inference.confidence, 0.75);
    assert!(inference.latency_ns >= 0);
}

#[test]
fn test_adapter_measures_forward_time() {
    let adapter = InferenceAdapter::new(Arc::new(OverlapScorer::new(true)));
    let inference = adapter.infer(&TokenSequence::zeros(4)).unwrap();
    assert!(inference.latency_ns >= Duration::from_millis(20).as_nanos() as i64);
}

#[test]
fn test_adapter_propagates_failure() {
    let adapter = InferenceAdapter::new(Arc::new(FailingScorer::default()));
    let err = adapter.infer(&TokenSequence::zeros(4)).unwrap_err();
    assert!(matches!(err, InferenceError::ForwardFailed { .. }));
}

#[test]
fn test_adapter_rejects_non_finite_output() {
    for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let adapter = InferenceAdapter::new(Arc::new(ConstantScorer(value)));
        let err = adapter.infer(&TokenSequence::zeros(4)).unwrap_err();
        assert!(matches!(err, InferenceError::NonFiniteOutput { .. }));
    }
}

#[test]
fn test_adapter_serializes_unsafe_scorer() {
    let scorer = Arc::new(OverlapScorer::new(false));
    let adapter = Arc::new(InferenceAdapter::new(scorer.clone()));
    assert!(adapter.is_serialized());

    run_parallel(adapter, 4);

    assert_eq!(scorer.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_adapter_forced_serialization() {
    let scorer = Arc::new(OverlapScorer::new(true));
    let adapter = Arc::new(InferenceAdapter::with_serialization(scorer.clone(), true));
    assert!(adapter.is_serialized());

    run_parallel(adapter, 4);

    assert_eq!(scorer.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_adapter_runs_safe_scorer_concurrently() {
    let scorer = Arc::new(OverlapScorer::new(true));
    let adapter = Arc::new(InferenceAdapter::new(scorer.clone()));
    assert!(!adapter.is_serialized());

    run_parallel(adapter, 4);

    assert!(scorer.peak.load(Ordering::SeqCst) > 1);
}

#[test]
fn test_bilstm_zero_weights_score_half() {
    let scorer = zero_scorer(0.0);
    let seq = TokenSequence::from_ids(vec![1, 5, 9], TEST_CONFIG.sequence_length);
    let confidence = scorer.score(&seq).unwrap();
    assert!((confidence - 0.5).abs() < 1e-6, "got {confidence}");
}

#[test]
fn test_bilstm_classifier_bias_reaches_output() {
    let scorer = zero_scorer(2.0);
    let confidence = scorer
        .score(&TokenSequence::zeros(TEST_CONFIG.sequence_length))
        .unwrap();
    let expected = 1.0 / (1.0 + (-2.0f32).exp());
    assert!((confidence - expected).abs() < 1e-5, "got {confidence}");
}

#[test]
fn test_bilstm_rejects_wrong_sequence_length() {
    let scorer = zero_scorer(0.0);
    let err = scorer.score(&TokenSequence::zeros(3)).unwrap_err();
    assert!(matches!(
        err,
        InferenceError::SequenceLength {
            expected: 6,
            actual: 3
        }
    ));
}

#[test]
fn test_bilstm_out_of_range_id_is_an_error_not_a_panic() {
    let scorer = zero_scorer(0.0);
    let seq = TokenSequence::from_ids(vec![TEST_CONFIG.vocab_size as i64 + 10], 6);
    assert!(scorer.score(&seq).is_err());
}

#[test]
fn test_bilstm_random_weights_are_deterministic_and_input_sensitive() {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let scorer = BiLstmScorer::from_var_builder(vb, TEST_CONFIG, &Device::Cpu).unwrap();

    let a = TokenSequence::from_ids(vec![1, 2, 3], 6);
    let b = TokenSequence::from_ids(vec![7, 8, 9, 10, 11, 12], 6);

    let score_a = scorer.score(&a).unwrap();
    assert_eq!(score_a, scorer.score(&a).unwrap());
    assert!((0.0..=1.0).contains(&score_a));

    let score_b = scorer.score(&b).unwrap();
    assert_ne!(score_a, score_b);
}

#[test]
fn test_bilstm_is_concurrent_safe_on_cpu() {
    let scorer = zero_scorer(0.0);
    assert!(scorer.is_concurrent_safe());
    assert_eq!(scorer.name(), "bilstm");
}

#[test]
fn test_bilstm_load_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path(), &TEST_CONFIG, 0.0);

    let scorer = BiLstmScorer::load(dir.path(), &Device::Cpu).expect("load model");
    assert_eq!(scorer.config(), &TEST_CONFIG);

    let confidence = scorer.score(&TokenSequence::zeros(6)).unwrap();
    assert!((confidence - 0.5).abs() < 1e-6);
}

#[test]
fn test_bilstm_load_missing_directory() {
    let err = BiLstmScorer::load("/nonexistent/model", &Device::Cpu).unwrap_err();
    assert!(matches!(err, InferenceError::ModelNotFound { .. }));
}

#[test]
fn test_bilstm_load_missing_weights() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(bilstm::CONFIG_FILE),
        serde_json::to_vec(&TEST_CONFIG).unwrap(),
    )
    .unwrap();

    let err = BiLstmScorer::load(dir.path(), &Device::Cpu).unwrap_err();
    assert!(matches!(err, InferenceError::ModelLoadFailed { .. }));
    assert!(err.to_string().contains("model.safetensors"));
}

#[test]
fn test_bilstm_load_shape_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path(), &TEST_CONFIG, 0.0);
    let bigger = BiLstmConfig {
        hidden_size: 8,
        ..TEST_CONFIG
    };
    std::fs::write(
        dir.path().join(bilstm::CONFIG_FILE),
        serde_json::to_vec(&bigger).unwrap(),
    )
    .unwrap();

    let err = BiLstmScorer::load(dir.path(), &Device::Cpu).unwrap_err();
    assert!(matches!(err, InferenceError::ModelLoadFailed { .. }));
}

#[test]
fn test_bilstm_config_rejects_zero_fields() {
    let config = BiLstmConfig {
        hidden_size: 0,
        ..TEST_CONFIG
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("hidden_size"));
}

#[test]
fn test_select_device_defaults_to_cpu() {
    let device = select_device().unwrap();
    if !cfg!(any(feature = "metal", feature = "cuda")) {
        assert!(device.is_cpu());
    }
}
