// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type LedgerSigner = SignerMiddleware<Arc<Provider<Http>>, LocalWallet>;

#[derive(Clone)]
pub struct Web3Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub confirmations: usize,
    pub polling_interval: Duration,
    pub private_key: Option<String>,
}

impl Default for Web3Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            confirmations: 1,
            polling_interval: Duration::from_millis(500),
            private_key: None,
        }
    }
}

// Keeps the signing key out of debug output
impl std::fmt::Debug for Web3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3Config")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("confirmations", &self.confirmations)
            .field("polling_interval", &self.polling_interval)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// JSON-RPC provider plus optional signer for one chain
pub struct Web3Client {
    pub provider: Arc<Provider<Http>>,
    signer: Option<Arc<LedgerSigner>>,
    config: Web3Config,
}

impl Web3Client {
    pub async fn new(config: Web3Config) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?
            .interval(config.polling_interval);

        // Verify connection
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| anyhow!("Failed to connect to RPC: {}", e))?;

        if chain_id.as_u64() != config.chain_id {
            return Err(anyhow!(
                "Chain ID mismatch: expected {}, got {}",
                config.chain_id,
                chain_id
            ));
        }

        let provider = Arc::new(provider);

        let signer = match &config.private_key {
            Some(private_key) => {
                let wallet = private_key
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|e| anyhow!("Invalid private key: {}", e))?
                    .with_chain_id(config.chain_id);
                Some(Arc::new(SignerMiddleware::new(provider.clone(), wallet)))
            }
            None => None,
        };

        info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            "Connected to ledger RPC"
        );

        Ok(Self {
            provider,
            signer,
            config,
        })
    }

    pub fn config(&self) -> &Web3Config {
        &self.config
    }

    /// Signer address, zero when no wallet is configured
    pub fn address(&self) -> Address {
        self.signer
            .as_ref()
            .map(|s| s.address())
            .unwrap_or_else(Address::zero)
    }

    pub fn signer(&self) -> Result<Arc<LedgerSigner>> {
        self.signer
            .clone()
            .ok_or_else(|| anyhow!("No wallet configured"))
    }
}
