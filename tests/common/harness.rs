//! Spawns the real router on an ephemeral port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use blocktweet::bootstrap::{Service, build_service};
use blocktweet::classifier::Classifier;
use blocktweet::config::Config;
use blocktweet::gateway::{AppState, create_router_with_state};
use blocktweet::inference::FailingScorer;
use blocktweet::text::{Preprocessor, SnowballStemmer};
use blocktweet::vocab::VocabularyIndex;

pub const TEST_VOCAB_JSON: &str =
    r#"{"hello": 1, "world": 2, "block": 3, "tweet": 4, "spam": 5, "run": 6}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestScorer {
    Stub,
    Failing,
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub scorer: TestScorer,
    pub sequence_length: usize,
    pub prediction_log: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            scorer: TestScorer::Stub,
            sequence_length: 34,
            prediction_log: false,
        }
    }
}

impl TestServerConfig {
    pub fn failing() -> Self {
        Self {
            scorer: TestScorer::Failing,
            ..Default::default()
        }
    }

    pub fn with_prediction_log() -> Self {
        Self {
            prediction_log: true,
            ..Default::default()
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: JoinHandle<()>,
    sink_task: Option<JoinHandle<()>>,
    log_path: Option<PathBuf>,
    dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_path.as_ref()
    }

    /// Stops accepting connections and waits for the prediction log to flush.
    ///
    /// Returns the temp dir so callers can still read the log.
    pub async fn shutdown(mut self) -> TempDir {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.server).await;
        if let Some(task) = self.sink_task.take() {
            let _ = task.await;
        }
        self.dir
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let dir = TempDir::new()?;
    let vocab_path = dir.path().join("word-index.json");
    std::fs::write(&vocab_path, TEST_VOCAB_JSON)?;

    let log_path = config
        .prediction_log
        .then(|| dir.path().join("predictions.jsonl"));

    let app_config = Config {
        vocab_path: vocab_path.clone(),
        stub_model: true,
        sequence_length: config.sequence_length,
        prediction_log: log_path.clone(),
        ..Default::default()
    };

    let Service {
        mut state,
        sink_task,
    } = build_service(&app_config).await?;

    if config.scorer == TestScorer::Failing {
        let vocab = Arc::new(VocabularyIndex::load(&vocab_path)?);
        let stemmer = Arc::new(SnowballStemmer::new("english")?);
        let classifier = Classifier::with_scorer(
            Preprocessor::new(vocab, stemmer),
            Arc::new(FailingScorer::default()),
            config.sequence_length,
        );
        state = AppState {
            classifier: Arc::new(classifier),
            ..state
        };
    }

    let app = create_router_with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    Ok(TestServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        server,
        sink_task,
        log_path,
        dir,
    })
}
