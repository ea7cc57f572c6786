// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_INTRA_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RETRIES_PER_RECORD: u32 = 10;

/// Fixed engine tuning. Adaptive parameters live in the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause between consecutive records of one batch
    pub intra_batch_delay: Duration,
    /// Upper bound on a single write; expiry counts as a retryable failure
    pub write_timeout: Duration,
    /// Retries of one record before it is given up as a permanent failure
    pub max_retries_per_record: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            intra_batch_delay: Duration::from_millis(DEFAULT_INTRA_BATCH_DELAY_MS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
            max_retries_per_record: DEFAULT_MAX_RETRIES_PER_RECORD,
        }
    }
}
