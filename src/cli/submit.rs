// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{shutdown_token, ConfigArgs};
use crate::checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
use crate::config::PipelineConfig;
use crate::contracts::{ContractLedgerClient, LedgerClient, MockLedgerClient, Web3Client};
use crate::engine::{EngineError, RunStart, RunSummary, StartMode, SubmissionEngine};
use crate::records::read_records;

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// CSV or JSON input file
    pub input: PathBuf,

    /// 0-based position of the first record to submit
    #[arg(long, default_value_t = 0, conflicts_with = "resume")]
    pub start_index: u64,

    /// Initial batch size (1-10)
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Initial delay between batches in milliseconds (500-5000)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Continue from the last checkpoint instead of starting fresh
    #[arg(long)]
    pub resume: bool,

    /// Checkpoint file (defaults to <checkpoint_dir>/<input stem>-<path digest>.checkpoint.json)
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Region used when a row has no state column
    #[arg(long)]
    pub region: Option<String>,

    /// Submit to an in-memory ledger; the checkpoint file is read but never written
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Input file whose default checkpoint to inspect
    #[arg(required_unless_present = "checkpoint")]
    pub input: Option<PathBuf>,

    /// Checkpoint file to inspect
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Fail unless the ledger holds at least this many records
    #[arg(long)]
    pub expect_at_least: Option<u64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Connect to the configured ledger contract
pub async fn connect_ledger(config: &PipelineConfig) -> Result<ContractLedgerClient> {
    if config.ledger.private_key.is_none() {
        return Err(anyhow!(
            "Signing key required. Set LEDGER_PRIVATE_KEY in the environment or .env"
        ));
    }
    let web3 = Web3Client::new(config.web3_config()).await?;
    let client = ContractLedgerClient::new(&web3, config.contract_address()?)?;
    info!(
        contract = ?client.address(),
        signer = ?web3.address(),
        "Ledger client ready"
    );
    Ok(client)
}

fn print_summary(summary: &RunSummary) {
    match summary.start {
        RunStart::NothingToResume => {
            println!("ℹ️  No checkpoint found, nothing to resume");
            return;
        }
        RunStart::Resumed => println!("\n🔁 Resumed run finished"),
        RunStart::Fresh => println!("\n✅ Run finished"),
    }

    println!("  Succeeded:      {}", summary.success_count);
    println!("  Failed:         {}", summary.failure_count);
    println!("  Total records:  {}", summary.total_count);
    println!("  Writes issued:  {}", summary.writes_issued);
    println!("  Batches:        {:?}", summary.batch_sizes);
    if summary.checkpoint_retained {
        println!("  Checkpoint retained at position {}", summary.next_index);
    } else {
        println!("  Checkpoint cleared");
    }
}

/// In-memory store for a dry run. The checkpoint file is only read when
/// resuming and is never written.
async fn dry_run_store(
    file_store: &FileCheckpointStore,
    resume: bool,
) -> Result<MemoryCheckpointStore> {
    if !resume {
        return Ok(MemoryCheckpointStore::new());
    }
    Ok(match file_store.load().await? {
        Some(state) => MemoryCheckpointStore::with_state(state),
        None => MemoryCheckpointStore::new(),
    })
}

/// Submit an input file
pub async fn submit(args: SubmitArgs) -> Result<()> {
    let config = args.config.load()?;
    let records = read_records(&args.input, args.region.as_deref())?;
    let checkpoint_path = args
        .checkpoint
        .clone()
        .unwrap_or_else(|| config.checkpoint_path_for(&args.input));

    let file_store = FileCheckpointStore::new(&checkpoint_path);
    let (ledger, store): (Arc<dyn LedgerClient>, Arc<dyn CheckpointStore>) = if args.dry_run {
        println!("🔍 DRY RUN MODE - No transactions will be submitted");
        let store = dry_run_store(&file_store, args.resume).await?;
        (Arc::new(MockLedgerClient::new()), Arc::new(store))
    } else {
        (Arc::new(connect_ledger(&config).await?), Arc::new(file_store))
    };

    let mode = if args.resume {
        StartMode::Resume
    } else {
        let pacing = config.pacing();
        StartMode::Fresh {
            start_index: args.start_index,
            batch_size: args.batch_size.unwrap_or(pacing.batch_size),
            delay_millis: args.delay_ms.unwrap_or(pacing.delay_millis),
        }
    };

    println!(
        "📋 {} records from {} (checkpoint: {})",
        records.len(),
        args.input.display(),
        checkpoint_path.display()
    );

    let engine = SubmissionEngine::new(ledger, store, config.engine_config())
        .with_cancellation(shutdown_token());

    match engine.run(&records, mode).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(EngineError::Cancelled { next_index }) => {
            println!(
                "⏸️  Interrupted. Checkpoint saved at position {}; rerun with --resume",
                next_index
            );
            Err(anyhow!("Run cancelled"))
        }
        Err(e) => {
            println!("❌ Run aborted: {}", e);
            println!("   Progress is saved; rerun with --resume once the cause is fixed");
            Err(e.into())
        }
    }
}

/// Show a stored checkpoint
pub async fn status(args: StatusArgs) -> Result<()> {
    let config = args.config.load()?;
    let path = match (&args.checkpoint, &args.input) {
        (Some(path), _) => path.clone(),
        (None, Some(input)) => config.checkpoint_path_for(input),
        (None, None) => return Err(anyhow!("Provide an input file or --checkpoint")),
    };

    let store = FileCheckpointStore::new(&path);
    match store.load().await? {
        None => println!("ℹ️  No checkpoint at {}", path.display()),
        Some(state) => {
            println!("\n📊 Checkpoint {}:", path.display());
            println!("  Next position:   {} of {}", state.next_index, state.total_count);
            println!("  Succeeded:       {}", state.success_count);
            println!("  Failed:          {}", state.failure_count);
            println!("  Last success:    {}", state.last_success_index);
            println!("  Batch size:      {}", state.batch_size);
            println!("  Delay:           {}ms", state.delay_millis);
            if let Some(updated_at) = state.updated_at {
                println!("  Updated:         {}", updated_at.to_rfc3339());
            }
        }
    }
    Ok(())
}

/// Read the ledger's aggregate count
pub async fn verify(args: VerifyArgs) -> Result<()> {
    let config = args.config.load()?;
    let ledger = connect_ledger(&config).await?;
    let count = ledger.read_aggregate_count().await?;

    println!("📊 Ledger holds {} records", count);
    if let Some(expected) = args.expect_at_least {
        if count < expected {
            return Err(anyhow!(
                "Ledger holds {} records, expected at least {}",
                count,
                expected
            ));
        }
        println!("✅ At least {} records present", expected);
    }
    Ok(())
}
