// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::error::LedgerError;
use super::types::LedgerReceipt;
use super::LedgerClient;
use crate::mapper::Submission;

/// One accepted write as seen by the mock ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub source_index: u64,
    pub label: String,
    pub counterparty: Address,
    pub reward_amount: u64,
    pub tx_hash: H256,
}

#[derive(Debug, Default)]
struct MockState {
    accepted: Vec<WriteRecord>,
    attempts: Vec<u64>,
    scripted: HashMap<u64, VecDeque<LedgerError>>,
    persistent: HashMap<u64, LedgerError>,
    count_error: Option<LedgerError>,
}

/// In-memory ledger with scripted per-record failures.
///
/// Failures are keyed by source index. Scripted failures are consumed one
/// per attempt; a persistent failure is returned on every attempt.
#[derive(Debug, Clone, Default)]
pub struct MockLedgerClient {
    state: Arc<RwLock<MockState>>,
    latency: Option<Duration>,
}

impl MockLedgerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write sleeps for `latency` before resolving
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue `errors` for successive attempts at `source_index`
    pub async fn script_failures(&self, source_index: u64, errors: Vec<LedgerError>) {
        self.state
            .write()
            .await
            .scripted
            .entry(source_index)
            .or_default()
            .extend(errors);
    }

    /// Fail every attempt at `source_index` with `error`
    pub async fn fail_always(&self, source_index: u64, error: LedgerError) {
        self.state.write().await.persistent.insert(source_index, error);
    }

    pub async fn fail_count_reads(&self, error: LedgerError) {
        self.state.write().await.count_error = Some(error);
    }

    /// Accepted writes in order
    pub async fn writes(&self) -> Vec<WriteRecord> {
        self.state.read().await.accepted.clone()
    }

    /// Source index of every write attempt, failed or not, in order
    pub async fn attempts(&self) -> Vec<u64> {
        self.state.read().await.attempts.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.state.read().await.accepted.len()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn write(&self, submission: &Submission) -> Result<LedgerReceipt, LedgerError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;
        state.attempts.push(submission.source_index);

        if let Some(err) = state.persistent.get(&submission.source_index) {
            return Err(err.clone());
        }
        if let Some(err) = state
            .scripted
            .get_mut(&submission.source_index)
            .and_then(|queue| queue.pop_front())
        {
            return Err(err);
        }

        let tx_hash = H256::from_low_u64_be(state.attempts.len() as u64);
        state.accepted.push(WriteRecord {
            source_index: submission.source_index,
            label: submission.label.clone(),
            counterparty: submission.pseudo_identity,
            reward_amount: submission.reward_amount,
            tx_hash,
        });

        Ok(LedgerReceipt {
            tx_hash,
            block_number: Some(state.accepted.len() as u64),
            gas_used: Some(U256::from(120_000u64)),
        })
    }

    async fn read_aggregate_count(&self) -> Result<u64, LedgerError> {
        let state = self.state.read().await;
        match &state.count_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.accepted.len() as u64),
        }
    }
}
