// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Checkpoint Store
//!
//! Durable progress marker for the submission engine. A checkpoint holds the
//! resume position, running counters and the adaptive pacing parameters, so
//! a restarted run continues at the same record with the same pace.
//!
//! ## Layout
//! JSON with camelCase keys:
//! `{ nextIndex, successCount, failureCount, totalCount, batchSize,
//!    delayMillis, lastSuccessIndex, inputFingerprint, updatedAt }`
//!
//! `inputFingerprint` is a digest of the record set the checkpoint was taken
//! over; a resume against different records is refused.
//!
//! `nextIndex` is the 0-based position of the first unresolved record; the
//! record at position `p` has source index `p + 1`.
//!
//! ## Writers
//! A store has exactly one writer, the engine driving it. Two runs pointed at
//! the same checkpoint file will overwrite each other; this is not locked.

pub mod file;
pub mod memory;

pub use file::{write_atomic, FileCheckpointStore};
pub use memory::MemoryCheckpointStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::engine::pacing::Pacing;
use crate::records::RawRecord;

/// Hex characters of the path digest kept in a checkpoint file name
const PATH_DIGEST_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Failed to serialize checkpoint: {0}")]
    Serialize(String),
}

/// Persisted pipeline progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointState {
    pub next_index: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_count: u64,
    pub batch_size: u32,
    pub delay_millis: u64,
    /// Source index of the most recent confirmed record, 0 when none
    pub last_success_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckpointState {
    /// Fresh state at `start_index` with clamped pacing
    pub fn fresh(start_index: u64, total_count: u64, pacing: Pacing) -> Self {
        let pacing = pacing.clamped();
        Self {
            next_index: start_index.min(total_count),
            success_count: 0,
            failure_count: 0,
            total_count,
            batch_size: pacing.batch_size,
            delay_millis: pacing.delay_millis,
            last_success_index: 0,
            input_fingerprint: None,
            updated_at: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.input_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            batch_size: self.batch_size,
            delay_millis: self.delay_millis,
        }
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        let pacing = pacing.clamped();
        self.batch_size = pacing.batch_size;
        self.delay_millis = pacing.delay_millis;
    }

    pub fn resolved_count(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// True once the run has walked off the end of the input
    pub fn reached_end(&self) -> bool {
        self.next_index >= self.total_count
    }

    /// Every record has a final outcome, so the checkpoint may be cleared
    pub fn is_complete(&self) -> bool {
        self.reached_end() && self.resolved_count() == self.total_count
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// sha256 over the canonical JSON of `records`, hex encoded
pub fn input_fingerprint(records: &[RawRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        // RawRecord is plain strings and options; serialization cannot fail
        if let Ok(bytes) = serde_json::to_vec(record) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Checkpoint file name for `input`: its stem plus a short digest of the
/// whole path, so equally named files in different directories never share
/// a checkpoint.
pub fn checkpoint_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let digest = hex::encode(Sha256::digest(input.to_string_lossy().as_bytes()));
    format!("{}-{}.checkpoint.json", stem, &digest[..PATH_DIGEST_LEN])
}

/// Durable storage for one pipeline's checkpoint
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the persisted state, `None` when no checkpoint exists
    async fn load(&self) -> Result<Option<CheckpointState>, CheckpointError>;

    /// Persist `state`. A crash mid-save must never leave a partial file
    /// visible to [`CheckpointStore::load`].
    async fn save(&self, state: &CheckpointState) -> Result<(), CheckpointError>;

    /// Remove persisted state after a completed run
    async fn clear(&self) -> Result<(), CheckpointError>;

    /// Human-readable location for logs
    fn location(&self) -> String;
}
