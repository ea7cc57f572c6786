// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::checkpoint::CheckpointStore;
use crate::contracts::LedgerClient;
use crate::engine::{EngineConfig, EngineError, Pacing, RunSummary, StartMode, SubmissionEngine};
use crate::records::RawRecord;

/// Runs one queued file through the pipeline
#[async_trait]
pub trait QueueRunner: Send + Sync {
    async fn run(
        &self,
        records: &[RawRecord],
        store: Arc<dyn CheckpointStore>,
        resume: bool,
    ) -> Result<RunSummary, EngineError>;
}

/// Queue runner backed by a [`SubmissionEngine`] sharing one ledger client
pub struct EngineRunner {
    ledger: Arc<dyn LedgerClient>,
    config: EngineConfig,
    pacing: Pacing,
    cancel: CancellationToken,
}

impl EngineRunner {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: EngineConfig, pacing: Pacing) -> Self {
        Self {
            ledger,
            config,
            pacing,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

#[async_trait]
impl QueueRunner for EngineRunner {
    async fn run(
        &self,
        records: &[RawRecord],
        store: Arc<dyn CheckpointStore>,
        resume: bool,
    ) -> Result<RunSummary, EngineError> {
        let engine = SubmissionEngine::new(self.ledger.clone(), store, self.config.clone())
            .with_cancellation(self.cancel.clone());

        let mode = if resume {
            StartMode::Resume
        } else {
            StartMode::Fresh {
                start_index: 0,
                batch_size: self.pacing.batch_size,
                delay_millis: self.pacing.delay_millis,
            }
        };
        engine.run(records, mode).await
    }
}
