// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Twelve-record end-to-end run against the mock ledger

use anyhow::Result;
use ctbal_submitter::{CheckpointStore, EngineConfig, RecordState, RunStart};

use super::helpers::{fresh, harness, records_with_ages, SCENARIO_AGES, SCENARIO_REWARDS};

#[tokio::test(start_paused = true)]
async fn test_twelve_records_all_confirmed() -> Result<()> {
    let h = harness(EngineConfig::default());
    let records = records_with_ages(&SCENARIO_AGES);

    let summary = h.engine.run(&records, fresh(5, 1000)).await?;

    assert_eq!(summary.start, RunStart::Fresh);
    assert_eq!(summary.success_count, 12);
    assert_eq!(summary.failure_count, 0);
    assert_eq!(summary.next_index, 12);
    assert_eq!(summary.writes_issued, 12);
    assert_eq!(summary.rewards(), SCENARIO_REWARDS.to_vec());
    assert!(summary
        .outcomes
        .iter()
        .all(|o| o.state == RecordState::Confirmed && o.attempts == 1));

    let written: Vec<u64> = h.ledger.writes().await.iter().map(|w| w.reward_amount).collect();
    assert_eq!(written, SCENARIO_REWARDS.to_vec());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_twelve_records_final_checkpoint() -> Result<()> {
    let h = harness(EngineConfig::default());
    let records = records_with_ages(&SCENARIO_AGES);

    let summary = h.engine.run(&records, fresh(5, 1000)).await?;

    let last = h.store.history().await.last().cloned().expect("saved at least once");
    assert_eq!(last.next_index, 12);
    assert_eq!(last.success_count, 12);
    assert_eq!(last.failure_count, 0);
    assert_eq!(last.last_success_index, 12);

    // Completed runs leave nothing to resume
    assert!(!summary.checkpoint_retained);
    assert!(h.store.load().await?.is_none());
    assert_eq!(h.store.clear_count().await, 1);
    Ok(())
}

/// Windows are sized by the pacing in force when each batch starts. The
/// first clean batch of 5 raises the next window to 6, which leaves 1, so
/// twelve records run as 5, 6, 1 rather than the 5, 5, 2 a constant pace of
/// 5 would give.
#[tokio::test(start_paused = true)]
async fn test_twelve_records_batch_windows() -> Result<()> {
    let h = harness(EngineConfig::default());
    let records = records_with_ages(&SCENARIO_AGES);

    let summary = h.engine.run(&records, fresh(5, 1000)).await?;

    // Each clean batch eases pacing: batch 5 -> 6 -> 7, delay 1000 -> 950 -> 902
    assert_eq!(summary.batch_sizes, vec![5, 6, 1]);
    let history = h.store.history().await;
    let saved: Vec<(u64, u32, u64)> = history
        .iter()
        .map(|s| (s.next_index, s.batch_size, s.delay_millis))
        .collect();
    assert_eq!(
        saved,
        vec![(0, 5, 1000), (5, 6, 950), (11, 7, 902), (12, 8, 856)]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_twelve_records_identities_unique() -> Result<()> {
    let h = harness(EngineConfig::default());
    let records = records_with_ages(&SCENARIO_AGES);
    h.engine.run(&records, fresh(5, 1000)).await?;

    let mut counterparties: Vec<_> = h.ledger.writes().await.iter().map(|w| w.counterparty).collect();
    counterparties.sort();
    counterparties.dedup();
    assert_eq!(counterparties.len(), 12);
    Ok(())
}
