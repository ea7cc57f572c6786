// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod queue;
pub mod submit;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::{ChainRegistry, PipelineConfig};

/// CTBAL ledger submission CLI
#[derive(Parser, Debug)]
#[command(name = "ctbal-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Resumable record submission to the CTBAL ledger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit every record of an input file
    Submit(submit::SubmitArgs),

    /// Show the checkpoint left by an interrupted run
    Status(submit::StatusArgs),

    /// Read the ledger's aggregate record count
    Verify(submit::VerifyArgs),

    /// Manage the ingest queue
    Queue {
        #[command(subcommand)]
        command: queue::QueueCommands,
    },

    /// Print version information
    Version,
}

/// Options shared by every command that touches configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, env = "CTBAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chain preset by name or id (hardhat, sepolia, 31337, 11155111)
    #[arg(long)]
    pub chain: Option<String>,
}

impl ConfigArgs {
    /// Resolve configuration: file, environment, then the chain preset
    pub fn load(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;

        if let Some(selector) = &self.chain {
            let registry = ChainRegistry::new();
            let chain = registry.resolve(selector).ok_or_else(|| {
                anyhow!(
                    "Chain {} not supported. Supported chains: {:?}",
                    selector,
                    registry.list_supported_chains()
                )
            })?;
            config.apply_chain(chain);
        }

        Ok(config)
    }
}

/// Token cancelled on Ctrl-C
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current write and saving checkpoint");
            child.cancel();
        }
    });
    token
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Submit(args) => submit::submit(args).await,
        Commands::Status(args) => submit::status(args).await,
        Commands::Verify(args) => submit::verify(args).await,
        Commands::Queue { command } => queue::execute(command).await,
        Commands::Version => {
            println!("{}", crate::version::get_version_string());
            println!(
                "{}",
                serde_json::to_string_pretty(&crate::version::get_version_info())?
            );
            Ok(())
        }
    }
}
