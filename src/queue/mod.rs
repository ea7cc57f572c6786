// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Ingest Queue
//!
//! Persistent list of input files waiting to be submitted. Each file is run
//! through the engine with its own checkpoint at
//! `<checkpoint_dir>/<stem>-<path digest>.checkpoint.json`; a file
//! interrupted part-way is resumed from that checkpoint on the next
//! `process_all`.

pub mod runner;

pub use runner::{EngineRunner, QueueRunner};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, warn};

use crate::checkpoint::{checkpoint_file_name, write_atomic, CheckpointStore, FileCheckpointStore};
use crate::engine::EngineError;
use crate::records::{read_records, region_from_filename};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Queue file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Input file not found: {0}")]
    NotFound(String),

    #[error("Input file already queued: {0}")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed { reason: String },
}

impl QueueStatus {
    /// Entries `process_all` will pick up
    pub fn is_runnable(&self) -> bool {
        matches!(self, QueueStatus::Pending | QueueStatus::Processing)
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub path: PathBuf,
    /// Default region derived from the file name
    pub region: Option<String>,
    #[serde(flatten)]
    pub status: QueueStatus,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    entries: Vec<QueueEntry>,
}

/// Outcome of one `process_all` pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueReport {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

pub struct IngestQueue {
    path: PathBuf,
    checkpoint_dir: PathBuf,
}

impl IngestQueue {
    pub fn new(path: impl Into<PathBuf>, checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checkpoint file used for `input`, keyed on its full path
    pub fn checkpoint_path_for(&self, input: &Path) -> PathBuf {
        self.checkpoint_dir.join(checkpoint_file_name(input))
    }

    fn io_error(&self, source: std::io::Error) -> QueueError {
        QueueError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    async fn load(&self) -> Result<QueueFile, QueueError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(QueueFile::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&contents).map_err(|e| QueueError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, queue: &QueueFile) -> Result<(), QueueError> {
        let json = serde_json::to_string_pretty(queue).map_err(|e| QueueError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|e| self.io_error(e))
    }

    /// Queue an input file. Rejects missing files and files already queued.
    pub async fn add(&self, input: &Path) -> Result<QueueEntry, QueueError> {
        let canonical = fs::canonicalize(input)
            .await
            .map_err(|_| QueueError::NotFound(input.display().to_string()))?;

        let mut queue = self.load().await?;
        if queue.entries.iter().any(|e| e.path == canonical) {
            return Err(QueueError::Duplicate(canonical.display().to_string()));
        }

        let now = Utc::now();
        let entry = QueueEntry {
            region: region_from_filename(&canonical),
            path: canonical,
            status: QueueStatus::Pending,
            added_at: now,
            updated_at: now,
            success_count: 0,
            failure_count: 0,
            total_count: 0,
        };
        queue.entries.push(entry.clone());
        self.save(&queue).await?;

        info!(
            path = %entry.path.display(),
            region = entry.region.as_deref().unwrap_or("-"),
            "Queued input file"
        );
        Ok(entry)
    }

    /// All entries in insertion order
    pub async fn status(&self) -> Result<Vec<QueueEntry>, QueueError> {
        Ok(self.load().await?.entries)
    }

    async fn update<F>(&self, index: usize, apply: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut QueueEntry),
    {
        let mut queue = self.load().await?;
        if let Some(entry) = queue.entries.get_mut(index) {
            apply(entry);
            entry.updated_at = Utc::now();
        }
        self.save(&queue).await
    }

    /// Run every pending or interrupted entry in insertion order.
    ///
    /// A file that fails is marked `Failed` and the queue moves on;
    /// cancellation stops the pass and leaves the current entry `Processing`
    /// with its checkpoint in place.
    pub async fn process_all(&self, runner: &dyn QueueRunner) -> Result<QueueReport, QueueError> {
        let entries = self.status().await?;
        let mut report = QueueReport::default();

        for (index, entry) in entries.iter().enumerate() {
            if !entry.status.is_runnable() {
                continue;
            }

            self.update(index, |e| e.status = QueueStatus::Processing)
                .await?;
            report.processed += 1;

            let records = match read_records(&entry.path, entry.region.as_deref()) {
                Ok(records) => records,
                Err(e) => {
                    error!(path = %entry.path.display(), error = %e, "Failed to read input");
                    self.update(index, |en| {
                        en.status = QueueStatus::Failed {
                            reason: e.to_string(),
                        }
                    })
                    .await?;
                    report.failed += 1;
                    continue;
                }
            };

            let checkpoint_path = self.checkpoint_path_for(&entry.path);
            let resume = checkpoint_path.exists();
            let store: Arc<dyn CheckpointStore> =
                Arc::new(FileCheckpointStore::new(&checkpoint_path));

            info!(
                path = %entry.path.display(),
                records = records.len(),
                resume,
                "Processing queued file"
            );

            match runner.run(&records, store, resume).await {
                Ok(summary) => {
                    self.update(index, |e| {
                        e.status = QueueStatus::Completed;
                        e.success_count = summary.success_count;
                        e.failure_count = summary.failure_count;
                        e.total_count = summary.total_count;
                    })
                    .await?;
                    report.completed += 1;
                }
                Err(EngineError::Cancelled { next_index }) => {
                    warn!(
                        path = %entry.path.display(),
                        next_index,
                        "Queue processing cancelled"
                    );
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!(path = %entry.path.display(), error = %e, "Queued file failed");
                    self.update(index, |en| {
                        en.status = QueueStatus::Failed {
                            reason: e.to_string(),
                        }
                    })
                    .await?;
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
