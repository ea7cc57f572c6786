// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cancellation saves progress at the last resolved record

use anyhow::Result;
use ctbal_submitter::{CheckpointStore, EngineConfig, EngineError, RunStart, StartMode};
use std::time::Duration;

use super::helpers::{fresh, harness, harness_with_store, uniform_records};

#[tokio::test(start_paused = true)]
async fn test_cancel_between_batches_then_resume() -> Result<()> {
    let records = uniform_records(12);
    let first = harness(EngineConfig::default());

    // Batch two ends at 1900ms, the next one would start at 2802ms
    let token = first.engine.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
    });

    let result = first.engine.run(&records, fresh(5, 1000)).await;
    assert!(matches!(result, Err(EngineError::Cancelled { next_index: 11 })));
    assert_eq!(first.ledger.write_count().await, 11);

    let saved = first.store.load().await?.expect("checkpoint kept");
    assert_eq!(saved.next_index, 11);
    assert_eq!(saved.success_count, 11);
    assert_eq!((saved.batch_size, saved.delay_millis), (7, 902));

    let second = harness_with_store(EngineConfig::default(), (*first.store).clone());
    let summary = second.engine.run(&records, StartMode::Resume).await?;

    assert_eq!(summary.start, RunStart::Resumed);
    assert_eq!(second.ledger.attempts().await, vec![12]);
    assert_eq!(summary.success_count, 12);
    assert!(!summary.checkpoint_retained);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start_writes_nothing() -> Result<()> {
    let h = harness(EngineConfig::default());
    h.engine.cancellation_token().cancel();

    let result = h.engine.run(&uniform_records(3), fresh(5, 1000)).await;

    assert!(matches!(result, Err(EngineError::Cancelled { next_index: 0 })));
    assert!(h.ledger.attempts().await.is_empty());
    assert_eq!(h.store.load().await?.map(|s| s.next_index), Some(0));
    Ok(())
}
