// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Submission Engine
//!
//! Drives records `[nextIndex..]` through a [`LedgerClient`] batch by batch.
//!
//! ## Batches
//! A batch is the window `[nextIndex, nextIndex + batchSize)` clipped to the
//! input. Records inside a batch are written one at a time, separated by a
//! short fixed delay; the signing identity's nonce sequence does not allow
//! concurrent writes. After each batch the checkpoint is saved and the engine
//! sleeps `delayMillis` before the next one.
//!
//! ## Failures
//! - Retryable: pacing backs off at once, the checkpoint is saved with the
//!   previous batch boundary and the new pacing, and the same record is
//!   retried after `delayMillis * 3`. Retries are bounded per record.
//! - Permanent: counted, logged, skipped.
//! - Fatal: progress up to the failing record is saved and the error is
//!   returned.
//!
//! Submissions are re-derived from the mapper on every run and never cached
//! across runs, so a resumed run regenerates byte-identical writes.

pub mod config;
pub mod outcome;
pub mod pacing;

pub use config::EngineConfig;
pub use outcome::{EngineError, RecordOutcome, RecordState, RunStart, RunSummary, StartMode};
pub use pacing::Pacing;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::checkpoint::{input_fingerprint, CheckpointError, CheckpointState, CheckpointStore};
use crate::contracts::{LedgerClient, LedgerError, LedgerErrorKind};
use crate::mapper::{map_record, Submission};
use crate::records::RawRecord;

/// Result of processing one batch
#[derive(Debug, Clone)]
pub struct StepReport {
    pub state: CheckpointState,
    pub window: u64,
    pub outcomes: Vec<RecordOutcome>,
    pub writes_issued: u64,
}

/// Reasons a record could not be resolved
enum Interrupt {
    Fatal(LedgerError),
    Cancelled,
    Checkpoint(CheckpointError),
}

pub struct SubmissionEngine {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn CheckpointStore>,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl SubmissionEngine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn CheckpointStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the pipeline over `records` until the input is exhausted.
    ///
    /// On completion the checkpoint is cleared when every record has a final
    /// outcome; otherwise it is left in place for a later `Resume`.
    pub async fn run(
        &self,
        records: &[RawRecord],
        mode: StartMode,
    ) -> Result<RunSummary, EngineError> {
        let total = records.len() as u64;

        let (mut state, start) = match self.initial_state(records, mode).await? {
            Some(initial) => initial,
            None => return Ok(RunSummary::nothing_to_resume(total)),
        };

        info!(
            checkpoint = %self.store.location(),
            start = ?start,
            next_index = state.next_index,
            total_count = total,
            batch_size = state.batch_size,
            delay_ms = state.delay_millis,
            "Starting submission run"
        );

        let mut batch_sizes = Vec::new();
        let mut outcomes = Vec::new();
        let mut writes_issued = 0u64;

        while !state.reached_end() {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(&state).await);
            }

            let report = self.step(records, state).await?;
            batch_sizes.push(report.window);
            outcomes.extend(report.outcomes);
            writes_issued += report.writes_issued;
            state = report.state;

            if !state.reached_end() && !self.pause(state.pacing().batch_delay()).await {
                return Err(self.cancelled(&state).await);
            }
        }

        let checkpoint_retained = if state.is_complete() {
            self.store.clear().await?;
            false
        } else {
            true
        };

        info!(
            success_count = state.success_count,
            failure_count = state.failure_count,
            total_count = state.total_count,
            writes_issued,
            checkpoint_retained,
            "Submission run finished"
        );

        Ok(RunSummary {
            start,
            success_count: state.success_count,
            failure_count: state.failure_count,
            total_count: state.total_count,
            next_index: state.next_index,
            writes_issued,
            batch_sizes,
            outcomes,
            checkpoint_retained,
            final_state: checkpoint_retained.then_some(state),
        })
    }

    /// Process one batch starting at `state.next_index` and persist the
    /// resulting state.
    pub async fn step(
        &self,
        records: &[RawRecord],
        mut state: CheckpointState,
    ) -> Result<StepReport, EngineError> {
        let total = records.len() as u64;
        let window_start = state.next_index.min(total);
        let window_end = window_start
            .saturating_add(state.batch_size as u64)
            .min(total);
        let boundary = state.clone();

        debug!(
            window_start,
            window_end,
            batch_size = state.batch_size,
            delay_ms = state.delay_millis,
            "Processing batch"
        );

        let mut outcomes = Vec::new();
        let mut writes_issued = 0u64;
        let mut throttled = false;
        let mut failures = 0u64;

        for position in window_start..window_end {
            if self.cancel.is_cancelled()
                || (position > window_start && !self.pause(self.config.intra_batch_delay).await)
            {
                return Err(self.cancelled(&state).await);
            }

            let submission = map_record(&records[position as usize], position + 1);
            let outcome = match self
                .submit(
                    &submission,
                    &mut state,
                    &boundary,
                    &mut writes_issued,
                    &mut throttled,
                )
                .await
            {
                Ok(outcome) => outcome,
                Err(Interrupt::Fatal(err)) => {
                    error!(
                        source_index = submission.source_index,
                        error = %err,
                        "Fatal ledger failure, aborting run"
                    );
                    self.persist_best_effort(&state).await;
                    return Err(EngineError::Fatal(err));
                }
                Err(Interrupt::Cancelled) => return Err(self.cancelled(&state).await),
                Err(Interrupt::Checkpoint(err)) => return Err(EngineError::Checkpoint(err)),
            };

            match outcome.state {
                RecordState::Confirmed => {
                    state.success_count += 1;
                    state.last_success_index = submission.source_index;
                    info!(
                        source_index = submission.source_index,
                        outcome = ?outcome.state,
                        attempts = outcome.attempts,
                        tx_hash = ?outcome.tx_hash,
                        label = %submission.label,
                        "Record confirmed"
                    );
                }
                _ => {
                    state.failure_count += 1;
                    failures += 1;
                    warn!(
                        source_index = submission.source_index,
                        outcome = ?outcome.state,
                        attempts = outcome.attempts,
                        error = outcome.error.as_deref().unwrap_or("-"),
                        "Record failed permanently, skipping"
                    );
                }
            }
            state.next_index = position + 1;
            outcomes.push(outcome);
        }

        if !throttled && failures == 0 && state.pacing().can_ease() {
            state.set_pacing(state.pacing().eased());
        }

        self.store.save(&state).await?;

        Ok(StepReport {
            state,
            window: window_end - window_start,
            outcomes,
            writes_issued,
        })
    }

    async fn initial_state(
        &self,
        records: &[RawRecord],
        mode: StartMode,
    ) -> Result<Option<(CheckpointState, RunStart)>, EngineError> {
        let total = records.len() as u64;
        let fingerprint = input_fingerprint(records);
        match mode {
            StartMode::Fresh {
                start_index,
                batch_size,
                delay_millis,
            } => {
                match self.store.load().await {
                    Ok(Some(existing)) => warn!(
                        checkpoint = %self.store.location(),
                        next_index = existing.next_index,
                        "Overwriting existing checkpoint, use resume to continue it"
                    ),
                    Ok(None) => {}
                    Err(CheckpointError::Corrupt { path, reason }) => warn!(
                        checkpoint = %path,
                        reason = %reason,
                        "Overwriting corrupt checkpoint"
                    ),
                    Err(e) => return Err(e.into()),
                }

                let state = CheckpointState::fresh(
                    start_index,
                    total,
                    Pacing::new(batch_size, delay_millis),
                )
                .with_fingerprint(fingerprint);
                self.store.save(&state).await?;
                Ok(Some((state, RunStart::Fresh)))
            }
            StartMode::Resume => match self.store.load().await? {
                None => {
                    info!(
                        checkpoint = %self.store.location(),
                        "No checkpoint found, nothing to resume"
                    );
                    Ok(None)
                }
                Some(mut state) => {
                    if state.total_count != total {
                        return Err(EngineError::InputMismatch {
                            expected: state.total_count,
                            actual: total,
                        });
                    }
                    // Checkpoints written before fingerprinting carry none
                    if let Some(stored) = &state.input_fingerprint {
                        if *stored != fingerprint {
                            return Err(EngineError::InputChanged {
                                checkpoint: self.store.location(),
                            });
                        }
                    }
                    state.input_fingerprint = Some(fingerprint);
                    state.next_index = state.next_index.min(total);
                    state.set_pacing(state.pacing());
                    Ok(Some((state, RunStart::Resumed)))
                }
            },
        }
    }

    /// Write one record, retrying it in place while the ledger signals
    /// throttling.
    async fn submit(
        &self,
        submission: &Submission,
        state: &mut CheckpointState,
        boundary: &CheckpointState,
        writes_issued: &mut u64,
        throttled: &mut bool,
    ) -> Result<RecordOutcome, Interrupt> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            *writes_issued += 1;
            debug!(
                source_index = submission.source_index,
                attempt = attempts,
                state = ?RecordState::Submitted,
                "Submitting record"
            );

            let result =
                match tokio::time::timeout(self.config.write_timeout, self.ledger.write(submission))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(LedgerError::retryable(format!(
                        "Write timed out after {}ms",
                        self.config.write_timeout.as_millis()
                    ))),
                };

            let err = match result {
                Ok(receipt) => {
                    return Ok(RecordOutcome {
                        source_index: submission.source_index,
                        state: RecordState::Confirmed,
                        attempts,
                        reward_amount: submission.reward_amount,
                        tx_hash: Some(receipt.tx_hash),
                        error: None,
                    })
                }
                Err(err) => err,
            };

            match err.kind {
                LedgerErrorKind::Permanent => {
                    return Ok(self.permanent(submission, attempts, err.message));
                }
                LedgerErrorKind::Fatal => return Err(Interrupt::Fatal(err)),
                LedgerErrorKind::Retryable => {}
            }

            *throttled = true;
            state.set_pacing(state.pacing().backed_off());

            // Progress stays at the batch boundary; only pacing moves mid-batch
            let mut snapshot = boundary.clone();
            snapshot.set_pacing(state.pacing());
            self.store
                .save(&snapshot)
                .await
                .map_err(Interrupt::Checkpoint)?;

            if attempts > self.config.max_retries_per_record {
                warn!(
                    source_index = submission.source_index,
                    attempts,
                    "Retries exhausted"
                );
                return Ok(self.permanent(
                    submission,
                    attempts,
                    format!("Retries exhausted: {}", err.message),
                ));
            }

            let wait = state.pacing().retry_wait();
            warn!(
                source_index = submission.source_index,
                outcome = ?RecordState::RetryableFailure,
                attempt = attempts,
                batch_size = state.batch_size,
                delay_ms = state.delay_millis,
                wait_ms = wait.as_millis() as u64,
                error = %err.message,
                "Retryable failure, backing off"
            );

            if !self.pause(wait).await {
                return Err(Interrupt::Cancelled);
            }
        }
    }

    fn permanent(&self, submission: &Submission, attempts: u32, message: String) -> RecordOutcome {
        RecordOutcome {
            source_index: submission.source_index,
            state: RecordState::PermanentFailure,
            attempts,
            reward_amount: submission.reward_amount,
            tx_hash: None,
            error: Some(message),
        }
    }

    /// Sleep for `duration`; false when cancelled first
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn persist_best_effort(&self, state: &CheckpointState) {
        if let Err(e) = self.store.save(state).await {
            error!(error = %e, "Failed to persist checkpoint");
        }
    }

    async fn cancelled(&self, state: &CheckpointState) -> EngineError {
        warn!(next_index = state.next_index, "Run cancelled, saving checkpoint");
        self.persist_best_effort(state).await;
        EngineError::Cancelled {
            next_index: state.next_index,
        }
    }
}
