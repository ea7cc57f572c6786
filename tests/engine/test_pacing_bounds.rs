// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pacing stays inside its bounds under sustained pressure and calm

use anyhow::Result;
use ctbal_submitter::{EngineConfig, LedgerError};

use super::helpers::{fresh, harness, uniform_records};

#[tokio::test(start_paused = true)]
async fn test_sustained_throttling_hits_ceiling() -> Result<()> {
    let config = EngineConfig {
        max_retries_per_record: 20,
        ..Default::default()
    };
    let h = harness(config);
    h.ledger
        .fail_always(1, LedgerError::retryable("rate limit"))
        .await;

    let summary = h.engine.run(&uniform_records(2), fresh(10, 500)).await?;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.success_count, 1);

    let history = h.store.history().await;
    assert!(history
        .iter()
        .all(|s| s.batch_size >= 1 && s.delay_millis <= 5000));
    let last = history.last().expect("saved state");
    assert_eq!((last.batch_size, last.delay_millis), (1, 5000));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clean_run_hits_floor() -> Result<()> {
    let h = harness(EngineConfig::default());

    h.engine.run(&uniform_records(600), fresh(1, 5000)).await?;

    let history = h.store.history().await;
    assert!(history
        .iter()
        .all(|s| s.batch_size <= 10 && s.delay_millis >= 500));
    let last = history.last().expect("saved state");
    assert_eq!((last.batch_size, last.delay_millis), (10, 500));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_initial_pacing_is_clamped() -> Result<()> {
    let h = harness(EngineConfig::default());

    let summary = h.engine.run(&uniform_records(12), fresh(50, 10)).await?;

    assert_eq!(summary.batch_sizes, vec![10, 2]);
    let first = &h.store.history().await[0];
    assert_eq!((first.batch_size, first.delay_millis), (10, 500));
    Ok(())
}
