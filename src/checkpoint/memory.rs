// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CheckpointError, CheckpointState, CheckpointStore};

#[derive(Debug, Default)]
struct Inner {
    current: Option<CheckpointState>,
    history: Vec<CheckpointState>,
    clears: usize,
}

/// In-process checkpoint store for dry runs and tests.
///
/// Keeps every saved state in order so callers can inspect how progress
/// evolved over a run.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `state`, as if left behind by an earlier run
    pub fn with_state(state: CheckpointState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                current: Some(state),
                ..Default::default()
            })),
        }
    }

    pub async fn current(&self) -> Option<CheckpointState> {
        self.inner.read().await.current.clone()
    }

    /// Every state passed to `save`, oldest first
    pub async fn history(&self) -> Vec<CheckpointState> {
        self.inner.read().await.history.clone()
    }

    pub async fn save_count(&self) -> usize {
        self.inner.read().await.history.len()
    }

    pub async fn clear_count(&self) -> usize {
        self.inner.read().await.clears
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self) -> Result<Option<CheckpointState>, CheckpointError> {
        Ok(self.inner.read().await.current.clone())
    }

    async fn save(&self, state: &CheckpointState) -> Result<(), CheckpointError> {
        let mut inner = self.inner.write().await;
        inner.current = Some(state.clone());
        inner.history.push(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CheckpointError> {
        let mut inner = self.inner.write().await;
        inner.current = None;
        inner.clears += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
