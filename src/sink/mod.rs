//! Optional audit log of served predictions.
//!
//! Recording never blocks a request: [`JsonlPredictionLog::record`] only
//! enqueues, and a background task appends one JSON object per line. Each
//! `text_hash` is written at most once per log file.
//!
//! The queue is bounded; when the writer falls behind, new records are
//! dropped with a warning. The set of logged hashes is held in memory for the
//! life of the process (8 bytes per distinct text, plus set overhead) and is
//! rebuilt from the file on open, so very long-lived logs should be rotated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::classifier::Prediction;
use crate::constants::PREDICTION_LOG_QUEUE_CAPACITY;

/// Destination for predictions after the response has been produced.
pub trait PredictionSink: Send + Sync {
    fn record(&self, prediction: &Prediction);
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open prediction log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line of the prediction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: String,
    pub text_hash: u64,
    pub text: String,
    pub confidence: f32,
    pub nanosecond: i64,
}

impl PredictionRecord {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            text_hash: prediction.content_hash,
            text: prediction.raw_text.clone(),
            confidence: prediction.confidence,
            nanosecond: prediction.latency_ns,
        }
    }
}

#[derive(Deserialize)]
struct HashOnly {
    text_hash: u64,
}

/// Append-only JSON Lines prediction log.
#[derive(Debug, Clone)]
pub struct JsonlPredictionLog {
    tx: mpsc::Sender<PredictionRecord>,
    path: PathBuf,
}

impl JsonlPredictionLog {
    /// Opens (or creates) the log at `path` and spawns its writer task.
    ///
    /// The writer exits once every clone of the returned log is dropped;
    /// await the handle to make sure queued records are flushed.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<(Self, JoinHandle<()>), SinkError> {
        Self::open_with_capacity(path, PREDICTION_LOG_QUEUE_CAPACITY).await
    }

    /// Like [`JsonlPredictionLog::open`] with an explicit queue bound (min 1).
    pub async fn open_with_capacity<P: AsRef<Path>>(
        path: P,
        capacity: usize,
    ) -> Result<(Self, JoinHandle<()>), SinkError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| SinkError::Open {
            path: path.clone(),
            source,
        };

        let seen = read_existing_hashes(&path).await.map_err(open_err)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(open_err)?;

        info!(
            path = %path.display(),
            existing = seen.len(),
            "Prediction log opened"
        );

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_writer(file, rx, seen, path.clone()));

        Ok((Self { tx, path }, handle))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PredictionSink for JsonlPredictionLog {
    fn record(&self, prediction: &Prediction) {
        match self.tx.try_send(PredictionRecord::from_prediction(prediction)) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                warn!(text_hash = record.text_hash, "Prediction log queue full; dropping record");
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Prediction log writer has stopped; dropping record");
            }
        }
    }
}

async fn read_existing_hashes(path: &Path) -> std::io::Result<HashSet<u64>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e),
    };

    let mut seen = HashSet::new();
    let mut lines = BufReader::new(file).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HashOnly>(&line) {
            Ok(entry) => {
                seen.insert(entry.text_hash);
            }
            Err(e) => warn!(error = %e, "Skipping unreadable prediction log line"),
        }
    }
    Ok(seen)
}

async fn run_writer(
    file: File,
    mut rx: mpsc::Receiver<PredictionRecord>,
    mut seen: HashSet<u64>,
    path: PathBuf,
) {
    let mut writer = BufWriter::new(file);

    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }

        for record in batch {
            if !seen.insert(record.text_hash) {
                debug!(text_hash = record.text_hash, "Prediction already logged");
                continue;
            }
            if let Err(e) = write_record(&mut writer, &record).await {
                error!(path = %path.display(), error = %e, "Failed to write prediction");
            }
        }

        if let Err(e) = writer.flush().await {
            error!(path = %path.display(), error = %e, "Failed to flush prediction log");
        }
    }

    if let Err(e) = writer.flush().await {
        error!(path = %path.display(), error = %e, "Failed to flush prediction log");
    }
    debug!(path = %path.display(), "Prediction log writer stopped");
}

async fn write_record(
    writer: &mut BufWriter<File>,
    record: &PredictionRecord,
) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(record).map_err(std::io::Error::other)?;
    line.push(b'\n');
    writer.write_all(&line).await
}
