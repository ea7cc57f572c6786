// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::H256;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{CheckpointError, CheckpointState};
use crate::contracts::LedgerError;

/// Lifecycle of one record inside a batch. A record not yet attempted has
/// no state; it is simply at or beyond `nextIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    Submitted,
    Confirmed,
    RetryableFailure,
    PermanentFailure,
}

/// Final outcome of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub source_index: u64,
    pub state: RecordState,
    pub attempts: u32,
    pub reward_amount: u64,
    pub tx_hash: Option<H256>,
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.state == RecordState::Confirmed
    }
}

/// How a run was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Start over at `start_index` (0-based) with the given initial pacing
    Fresh {
        start_index: u64,
        batch_size: u32,
        delay_millis: u64,
    },
    /// Continue from the stored checkpoint
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStart {
    Fresh,
    Resumed,
    /// `Resume` was requested but no checkpoint existed
    NothingToResume,
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub start: RunStart,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_count: u64,
    pub next_index: u64,
    /// Every write attempt, including retries
    pub writes_issued: u64,
    /// Window size of each batch in processing order
    pub batch_sizes: Vec<u64>,
    pub outcomes: Vec<RecordOutcome>,
    /// A checkpoint remains on disk for a later resume
    pub checkpoint_retained: bool,
    pub final_state: Option<CheckpointState>,
}

impl RunSummary {
    pub fn nothing_to_resume(total_count: u64) -> Self {
        Self {
            start: RunStart::NothingToResume,
            success_count: 0,
            failure_count: 0,
            total_count,
            next_index: 0,
            writes_issued: 0,
            batch_sizes: Vec::new(),
            outcomes: Vec::new(),
            checkpoint_retained: false,
            final_state: None,
        }
    }

    pub fn rewards(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter(|o| o.is_confirmed())
            .map(|o| o.reward_amount)
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Fatal ledger failure: {0}")]
    Fatal(LedgerError),

    #[error("Checkpoint failure: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Checkpoint covers {expected} records but the input has {actual}")]
    InputMismatch { expected: u64, actual: u64 },

    #[error("Checkpoint {checkpoint} was taken over different records")]
    InputChanged { checkpoint: String },

    #[error("Run cancelled, resume at position {next_index}")]
    Cancelled { next_index: u64 },
}
