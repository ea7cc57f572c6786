// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! File-backed checkpoints driven through the engine

use anyhow::Result;
use ctbal_submitter::{
    CheckpointError, CheckpointState, CheckpointStore, EngineConfig, EngineError,
    FileCheckpointStore, LedgerError, MockLedgerClient, Pacing, RawRecord, StartMode,
    SubmissionEngine,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn records(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| RawRecord::new(&format!("Person {}", i), "OH", "1950-01-01", "2020-01-01"))
        .collect()
}

fn quick_config() -> EngineConfig {
    EngineConfig {
        intra_batch_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn engine(ledger: Arc<MockLedgerClient>, store: Arc<FileCheckpointStore>) -> SubmissionEngine {
    SubmissionEngine::new(ledger, store, quick_config())
}

#[tokio::test]
async fn test_stale_temp_file_is_ignored() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("run.checkpoint.json");
    let store = FileCheckpointStore::new(&path);

    let mut state = CheckpointState::fresh(0, 10, Pacing::default());
    state.next_index = 4;
    store.save(&state).await?;

    // Leftover from a save interrupted before its rename
    tokio::fs::write(dir.path().join("run.checkpoint.json.tmp"), b"{\"nextIndex\": 9").await?;

    let loaded = store.load().await?.expect("checkpoint");
    assert_eq!(loaded.next_index, 4);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_checkpoint_blocks_resume() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("run.checkpoint.json");
    tokio::fs::write(&path, b"not json at all").await?;

    let ledger = Arc::new(MockLedgerClient::new());
    let store = Arc::new(FileCheckpointStore::new(&path));
    let result = engine(ledger.clone(), store).run(&records(3), StartMode::Resume).await;

    assert!(matches!(
        result,
        Err(EngineError::Checkpoint(CheckpointError::Corrupt { .. }))
    ));
    assert!(ledger.attempts().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_fresh_run_replaces_corrupt_checkpoint() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("run.checkpoint.json");
    tokio::fs::write(&path, b"{\"nextIndex\": ").await?;

    let ledger = Arc::new(MockLedgerClient::new());
    let store = Arc::new(FileCheckpointStore::new(&path));
    let summary = engine(ledger.clone(), store)
        .run(
            &records(3),
            StartMode::Fresh {
                start_index: 0,
                batch_size: 5,
                delay_millis: 500,
            },
        )
        .await?;

    assert_eq!(summary.success_count, 3);
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn test_fatal_failure_leaves_resumable_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("run.checkpoint.json");
    let input = records(4);

    let ledger = Arc::new(MockLedgerClient::new());
    ledger
        .script_failures(3, vec![LedgerError::classify("401 Unauthorized")])
        .await;
    let store = Arc::new(FileCheckpointStore::new(&path));
    let result = engine(ledger, store.clone())
        .run(
            &input,
            StartMode::Fresh {
                start_index: 0,
                batch_size: 5,
                delay_millis: 500,
            },
        )
        .await;
    assert!(matches!(result, Err(EngineError::Fatal(_))));

    let saved: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    assert_eq!(saved["nextIndex"], 2);
    assert_eq!(saved["successCount"], 2);
    assert_eq!(saved["totalCount"], 4);
    assert!(saved["updatedAt"].is_string());
    assert!(saved["inputFingerprint"].is_string());

    let resumed = Arc::new(MockLedgerClient::new());
    let summary = engine(resumed.clone(), store)
        .run(&input, StartMode::Resume)
        .await?;
    assert_eq!(resumed.attempts().await, vec![3, 4]);
    assert_eq!(summary.success_count, 4);
    assert!(!path.exists());
    Ok(())
}
