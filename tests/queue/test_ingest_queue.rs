// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use async_trait::async_trait;
use ctbal_submitter::queue::QueueRunner;
use ctbal_submitter::{
    CheckpointState, CheckpointStore, EngineConfig, EngineError, EngineRunner,
    FileCheckpointStore, IngestQueue, MockLedgerClient, Pacing, QueueError, QueueStatus,
    RawRecord, RunSummary,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    queue: IngestQueue,
}

impl Fixture {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let queue = IngestQueue::new(dir.path().join("queue.json"), dir.path().join("checkpoints"));
        Ok(Self { dir, queue })
    }

    fn write_csv(&self, name: &str, rows: usize) -> Result<PathBuf> {
        self.write_csv_in(self.dir.path(), name, rows)
    }

    fn write_csv_in(&self, dir: &Path, name: &str, rows: usize) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let mut contents = String::from("name,city,birth_date,death_date\n");
        for i in 0..rows {
            contents.push_str(&format!("Person {},Springfield,1950-01-01,2020-01-01\n", i));
        }
        let path = dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

fn runner(ledger: Arc<MockLedgerClient>) -> EngineRunner {
    let config = EngineConfig {
        intra_batch_delay: Duration::ZERO,
        ..Default::default()
    };
    EngineRunner::new(ledger, config, Pacing::new(10, 500))
}

#[tokio::test]
async fn test_add_rejects_missing_file() -> Result<()> {
    let fx = Fixture::new()?;
    let result = fx.queue.add(Path::new("/nonexistent/FL_missing.csv")).await;
    assert!(matches!(result, Err(QueueError::NotFound(_))));
    assert!(fx.queue.status().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_add_rejects_duplicates() -> Result<()> {
    let fx = Fixture::new()?;
    let path = fx.write_csv("FL_20251118_deaths.csv", 2)?;

    let entry = fx.queue.add(&path).await?;
    assert_eq!(entry.region.as_deref(), Some("FL"));
    assert_eq!(entry.status, QueueStatus::Pending);

    let again = fx.queue.add(&path).await;
    assert!(matches!(again, Err(QueueError::Duplicate(_))));
    assert_eq!(fx.queue.status().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_process_all_continues_past_bad_file() -> Result<()> {
    let fx = Fixture::new()?;
    let florida = fx.write_csv("FL_batch.csv", 3)?;
    let broken = fx.dir.path().join("broken.json");
    std::fs::write(&broken, "{not json")?;
    let georgia = fx.write_csv("GA_batch.csv", 2)?;
    for path in [&florida, &broken, &georgia] {
        fx.queue.add(path).await?;
    }

    let ledger = Arc::new(MockLedgerClient::new());
    let report = fx.queue.process_all(&runner(ledger.clone())).await?;

    assert_eq!(report.processed, 3);
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.cancelled);
    assert_eq!(ledger.write_count().await, 5);

    let labels: Vec<String> = ledger.writes().await.into_iter().map(|w| w.label).collect();
    assert!(labels[..3].iter().all(|l| l.ends_with("- FL")));
    assert!(labels[3..].iter().all(|l| l.ends_with("- GA")));

    let entries = fx.queue.status().await?;
    assert_eq!(entries[0].status, QueueStatus::Completed);
    assert_eq!(entries[0].success_count, 3);
    assert!(matches!(entries[1].status, QueueStatus::Failed { .. }));
    assert_eq!(entries[2].total_count, 2);
    assert!(!fx.queue.checkpoint_path_for(&florida).exists());

    // Completed and failed entries are not picked up again
    let second = fx.queue.process_all(&runner(ledger.clone())).await?;
    assert_eq!(second.processed, 0);
    assert_eq!(ledger.write_count().await, 5);
    Ok(())
}

#[tokio::test]
async fn test_process_all_resumes_interrupted_file() -> Result<()> {
    let fx = Fixture::new()?;
    let path = fx.write_csv("OH_batch.csv", 3)?;
    let entry = fx.queue.add(&path).await?;

    let mut state = CheckpointState::fresh(0, 3, Pacing::default());
    state.next_index = 2;
    state.success_count = 2;
    state.last_success_index = 2;
    FileCheckpointStore::new(fx.queue.checkpoint_path_for(&entry.path))
        .save(&state)
        .await?;

    let ledger = Arc::new(MockLedgerClient::new());
    fx.queue.process_all(&runner(ledger.clone())).await?;

    assert_eq!(ledger.attempts().await, vec![3]);
    let entries = fx.queue.status().await?;
    assert_eq!(entries[0].status, QueueStatus::Completed);
    assert_eq!(entries[0].success_count, 3);
    Ok(())
}

#[tokio::test]
async fn test_same_named_files_keep_separate_checkpoints() -> Result<()> {
    let fx = Fixture::new()?;
    let first = fx.write_csv_in(&fx.dir.path().join("a"), "deaths.csv", 5)?;
    let second = fx.write_csv_in(&fx.dir.path().join("b"), "deaths.csv", 5)?;
    let first_entry = fx.queue.add(&first).await?;
    let second_entry = fx.queue.add(&second).await?;
    assert_ne!(
        fx.queue.checkpoint_path_for(&first_entry.path),
        fx.queue.checkpoint_path_for(&second_entry.path)
    );

    // First file was interrupted after four records
    let mut state = CheckpointState::fresh(0, 5, Pacing::default());
    state.next_index = 4;
    state.success_count = 4;
    state.last_success_index = 4;
    FileCheckpointStore::new(fx.queue.checkpoint_path_for(&first_entry.path))
        .save(&state)
        .await?;

    let ledger = Arc::new(MockLedgerClient::new());
    let report = fx.queue.process_all(&runner(ledger.clone())).await?;

    assert_eq!(report.completed, 2);
    assert_eq!(ledger.attempts().await, vec![5, 1, 2, 3, 4, 5]);
    let entries = fx.queue.status().await?;
    assert_eq!(entries[0].success_count, 5);
    assert_eq!(entries[1].success_count, 5);
    Ok(())
}

struct CancellingRunner;

#[async_trait]
impl QueueRunner for CancellingRunner {
    async fn run(
        &self,
        _records: &[RawRecord],
        _store: Arc<dyn CheckpointStore>,
        _resume: bool,
    ) -> Result<RunSummary, EngineError> {
        Err(EngineError::Cancelled { next_index: 1 })
    }
}

#[tokio::test]
async fn test_cancellation_stops_the_pass() -> Result<()> {
    let fx = Fixture::new()?;
    fx.queue.add(&fx.write_csv("FL_one.csv", 2)?).await?;
    fx.queue.add(&fx.write_csv("FL_two.csv", 2)?).await?;

    let report = fx.queue.process_all(&CancellingRunner).await?;

    assert!(report.cancelled);
    assert_eq!(report.processed, 1);
    let entries = fx.queue.status().await?;
    assert_eq!(entries[0].status, QueueStatus::Processing);
    assert_eq!(entries[1].status, QueueStatus::Pending);
    Ok(())
}
