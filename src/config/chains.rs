// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const HARDHAT_CHAIN_ID: u64 = 31337;
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

// First contract deployed by the default Hardhat account
const HARDHAT_FIRST_DEPLOYMENT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    /// Deployed ledger contract, when known for this chain
    pub ledger_contract: Option<Address>,
    pub confirmation_blocks: usize,
}

impl ChainConfig {
    pub fn hardhat() -> Self {
        ChainConfig {
            chain_id: HARDHAT_CHAIN_ID,
            name: "Hardhat Local".to_string(),
            rpc_url: std::env::var("HARDHAT_RPC_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
            ledger_contract: std::env::var("HARDHAT_LEDGER_CONTRACT")
                .ok()
                .and_then(|addr| Address::from_str(&addr).ok())
                .or_else(|| Address::from_str(HARDHAT_FIRST_DEPLOYMENT).ok()),
            confirmation_blocks: 1,
        }
    }

    pub fn sepolia() -> Self {
        ChainConfig {
            chain_id: SEPOLIA_CHAIN_ID,
            name: "Sepolia".to_string(),
            rpc_url: std::env::var("SEPOLIA_RPC_URL")
                .unwrap_or_else(|_| "https://rpc.sepolia.org".to_string()),
            // Deployed per environment
            ledger_contract: std::env::var("SEPOLIA_LEDGER_CONTRACT")
                .ok()
                .and_then(|addr| Address::from_str(&addr).ok()),
            confirmation_blocks: 2,
        }
    }
}

pub struct ChainRegistry {
    chains: HashMap<u64, ChainConfig>,
    default_chain: u64,
}

impl ChainRegistry {
    pub fn new() -> Self {
        let mut chains = HashMap::new();
        chains.insert(HARDHAT_CHAIN_ID, ChainConfig::hardhat());
        chains.insert(SEPOLIA_CHAIN_ID, ChainConfig::sepolia());

        ChainRegistry {
            chains,
            default_chain: HARDHAT_CHAIN_ID,
        }
    }

    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    /// Look up by chain id or case-insensitive short name (`hardhat`, `sepolia`)
    pub fn resolve(&self, selector: &str) -> Option<&ChainConfig> {
        if let Ok(chain_id) = selector.parse::<u64>() {
            return self.get_chain(chain_id);
        }
        match selector.to_ascii_lowercase().as_str() {
            "hardhat" | "localhost" | "local" => self.get_chain(HARDHAT_CHAIN_ID),
            "sepolia" => self.get_chain(SEPOLIA_CHAIN_ID),
            _ => None,
        }
    }

    pub fn default_chain(&self) -> u64 {
        self.default_chain
    }

    pub fn list_supported_chains(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chains.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_chain_supported(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
