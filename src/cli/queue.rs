// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use super::submit::connect_ledger;
use super::{shutdown_token, ConfigArgs};
use crate::contracts::LedgerClient;
use crate::queue::{EngineRunner, IngestQueue, QueueStatus};

#[derive(Subcommand, Debug)]
pub enum QueueCommands {
    /// Add input files to the queue
    Add(AddArgs),

    /// List queued files and their status
    Status(ConfigArgs),

    /// Process every pending file in order
    ProcessAll(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// CSV or JSON input files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub async fn execute(command: QueueCommands) -> Result<()> {
    match command {
        QueueCommands::Add(args) => add(args).await,
        QueueCommands::Status(args) => status(args).await,
        QueueCommands::ProcessAll(args) => process_all(args).await,
    }
}

fn open_queue(config: &ConfigArgs) -> Result<IngestQueue> {
    let config = config.load()?;
    Ok(IngestQueue::new(
        config.queue_path(),
        config.paths.checkpoint_dir.clone(),
    ))
}

async fn add(args: AddArgs) -> Result<()> {
    let queue = open_queue(&args.config)?;
    let mut added = 0usize;

    for input in &args.inputs {
        match queue.add(input).await {
            Ok(entry) => {
                added += 1;
                println!(
                    "➕ {} (region: {})",
                    entry.path.display(),
                    entry.region.as_deref().unwrap_or("from rows")
                );
            }
            Err(e) => println!("⚠️  Skipped {}: {}", input.display(), e),
        }
    }

    println!("✅ Added {} of {} files", added, args.inputs.len());
    Ok(())
}

async fn status(args: ConfigArgs) -> Result<()> {
    let queue = open_queue(&args)?;
    let entries = queue.status().await?;

    if entries.is_empty() {
        println!("ℹ️  Queue is empty");
        return Ok(());
    }

    println!("\n📊 Queue {}:", queue.path().display());
    for entry in &entries {
        let detail = match &entry.status {
            QueueStatus::Failed { reason } => format!(" - {}", reason),
            QueueStatus::Completed => format!(
                " - {} ok, {} failed of {}",
                entry.success_count, entry.failure_count, entry.total_count
            ),
            _ => String::new(),
        };
        println!(
            "  [{:<10}] {}{}",
            entry.status.label(),
            entry.path.display(),
            detail
        );
    }

    let pending = entries.iter().filter(|e| e.status.is_runnable()).count();
    println!("\n  {} of {} files still to process", pending, entries.len());
    Ok(())
}

async fn process_all(args: ConfigArgs) -> Result<()> {
    let config = args.load()?;
    let queue = IngestQueue::new(config.queue_path(), config.paths.checkpoint_dir.clone());
    let ledger: Arc<dyn LedgerClient> = Arc::new(connect_ledger(&config).await?);

    let runner = EngineRunner::new(ledger, config.engine_config(), config.pacing())
        .with_cancellation(shutdown_token());
    let report = queue.process_all(&runner).await?;

    println!(
        "\n📦 Processed {} files: {} completed, {} failed",
        report.processed, report.completed, report.failed
    );

    if report.cancelled {
        println!("⏸️  Interrupted. Rerun process-all to resume the current file");
        return Err(anyhow!("Queue processing cancelled"));
    }
    Ok(())
}
