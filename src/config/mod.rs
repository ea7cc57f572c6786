// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline configuration
//!
//! Sources, later wins: built-in defaults, a TOML file with `[ledger]`,
//! `[engine]` and `[paths]` tables, environment variables (a `.env` file is
//! loaded first), then a `--chain` preset.

pub mod chains;

pub use chains::{ChainConfig, ChainRegistry};

use anyhow::{anyhow, Context, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::checkpoint::checkpoint_file_name;
use crate::contracts::Web3Config;
use crate::engine::config::{
    DEFAULT_INTRA_BATCH_DELAY_MS, DEFAULT_MAX_RETRIES_PER_RECORD, DEFAULT_WRITE_TIMEOUT_SECS,
};
use crate::engine::pacing::{DEFAULT_BATCH_SIZE, DEFAULT_DELAY_MS};
use crate::engine::{EngineConfig, Pacing};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: Option<String>,
    pub confirmations: usize,
    /// Only ever read from the environment
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: chains::HARDHAT_CHAIN_ID,
            contract_address: None,
            confirmations: 1,
            private_key: None,
        }
    }
}

impl std::fmt::Debug for LedgerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerSettings")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("contract_address", &self.contract_address)
            .field("confirmations", &self.confirmations)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub batch_size: u32,
    pub delay_ms: u64,
    pub intra_batch_delay_ms: u64,
    pub write_timeout_secs: u64,
    pub max_retries_per_record: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay_ms: DEFAULT_DELAY_MS,
            intra_batch_delay_ms: DEFAULT_INTRA_BATCH_DELAY_MS,
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT_SECS,
            max_retries_per_record: DEFAULT_MAX_RETRIES_PER_RECORD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub checkpoint_dir: PathBuf,
    /// Defaults to `<checkpoint_dir>/queue.json`
    pub queue_file: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("checkpoints"),
            queue_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ledger: LedgerSettings,
    pub engine: EngineSettings,
    pub paths: PathSettings,
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Full resolution used by the CLI: `.env`, optional file, environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LEDGER_RPC_URL") {
            self.ledger.rpc_url = url;
        }
        if let Some(chain_id) = parse_var(&lookup, "LEDGER_CHAIN_ID") {
            self.ledger.chain_id = chain_id;
        }
        if let Some(address) = lookup("LEDGER_CONTRACT_ADDRESS") {
            self.ledger.contract_address = Some(address);
        }
        if let Some(key) = lookup("LEDGER_PRIVATE_KEY") {
            self.ledger.private_key = Some(key);
        }
        if let Some(confirmations) = parse_var(&lookup, "LEDGER_CONFIRMATIONS") {
            self.ledger.confirmations = confirmations;
        }
        if let Some(dir) = lookup("CHECKPOINT_DIR") {
            self.paths.checkpoint_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var(&lookup, "WRITE_TIMEOUT_SECS") {
            self.engine.write_timeout_secs = secs;
        }
        if let Some(ms) = parse_var(&lookup, "INTRA_BATCH_DELAY_MS") {
            self.engine.intra_batch_delay_ms = ms;
        }
        if let Some(retries) = parse_var(&lookup, "MAX_RETRIES_PER_RECORD") {
            self.engine.max_retries_per_record = retries;
        }
    }

    /// Point the ledger settings at a registry preset
    pub fn apply_chain(&mut self, chain: &ChainConfig) {
        self.ledger.rpc_url = chain.rpc_url.clone();
        self.ledger.chain_id = chain.chain_id;
        self.ledger.confirmations = chain.confirmation_blocks;
        if let Some(address) = chain.ledger_contract {
            self.ledger.contract_address = Some(format!("{:?}", address));
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            intra_batch_delay: Duration::from_millis(self.engine.intra_batch_delay_ms),
            write_timeout: Duration::from_secs(self.engine.write_timeout_secs),
            max_retries_per_record: self.engine.max_retries_per_record,
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::new(self.engine.batch_size, self.engine.delay_ms)
    }

    pub fn web3_config(&self) -> Web3Config {
        Web3Config {
            rpc_url: self.ledger.rpc_url.clone(),
            chain_id: self.ledger.chain_id,
            confirmations: self.ledger.confirmations,
            private_key: self.ledger.private_key.clone(),
            ..Default::default()
        }
    }

    pub fn contract_address(&self) -> Result<Address> {
        let raw = self
            .ledger
            .contract_address
            .as_deref()
            .ok_or_else(|| anyhow!("Ledger contract address not set (LEDGER_CONTRACT_ADDRESS)"))?;
        Address::from_str(raw).map_err(|e| anyhow!("Invalid ledger contract address {}: {}", raw, e))
    }

    pub fn queue_path(&self) -> PathBuf {
        self.paths
            .queue_file
            .clone()
            .unwrap_or_else(|| self.paths.checkpoint_dir.join("queue.json"))
    }

    /// Default checkpoint location for a single input file, keyed on its
    /// canonical path so the queue and the CLI agree on it
    pub fn checkpoint_path_for(&self, input: &Path) -> PathBuf {
        let canonical = std::fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
        self.paths.checkpoint_dir.join(checkpoint_file_name(&canonical))
    }
}
