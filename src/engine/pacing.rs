// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Adaptive pacing
//!
//! Two knobs, batch size and inter-batch delay, move in opposite directions:
//! a retryable signal from the ledger shrinks batches and stretches the
//! delay, a clean batch eases both back. Both are clamped on every change.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_BATCH_SIZE: u32 = 1;
pub const MAX_BATCH_SIZE: u32 = 10;
pub const MIN_DELAY_MS: u64 = 500;
pub const MAX_DELAY_MS: u64 = 5000;

pub const DEFAULT_BATCH_SIZE: u32 = 5;
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Wait before retrying a throttled record, as a multiple of the delay
pub const RETRY_WAIT_MULTIPLIER: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    pub batch_size: u32,
    pub delay_millis: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay_millis: DEFAULT_DELAY_MS,
        }
    }
}

impl Pacing {
    pub fn new(batch_size: u32, delay_millis: u64) -> Self {
        Self {
            batch_size,
            delay_millis,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            batch_size: self.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE),
            delay_millis: self.delay_millis.clamp(MIN_DELAY_MS, MAX_DELAY_MS),
        }
    }

    /// Reaction to a retryable signal: delay x1.5, batch x0.8 (floored)
    pub fn backed_off(self) -> Self {
        Self {
            batch_size: self.batch_size * 4 / 5,
            delay_millis: self.delay_millis.saturating_mul(3) / 2,
        }
        .clamped()
    }

    /// Reaction to a clean batch: delay x0.95 (floored), batch +1
    pub fn eased(self) -> Self {
        Self {
            batch_size: self.batch_size.saturating_add(1),
            delay_millis: self.delay_millis.saturating_mul(19) / 20,
        }
        .clamped()
    }

    /// Easing only applies while the delay is above its floor
    pub fn can_ease(&self) -> bool {
        self.delay_millis > MIN_DELAY_MS
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.delay_millis)
    }

    pub fn retry_wait(&self) -> Duration {
        Duration::from_millis(self.delay_millis.saturating_mul(RETRY_WAIT_MULTIPLIER))
    }
}
