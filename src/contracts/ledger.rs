// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use async_trait::async_trait;
use ethers::prelude::*;
use tracing::debug;

use super::client::{LedgerSigner, Web3Client};
use super::error::{classify_revert, LedgerError};
use super::types::{CtbalLedger, LedgerReceipt};
use super::LedgerClient;
use crate::mapper::Submission;

/// Ledger client backed by the deployed `CtbalLedger` contract
pub struct ContractLedgerClient {
    contract: CtbalLedger<LedgerSigner>,
    confirmations: usize,
}

impl ContractLedgerClient {
    pub fn new(web3: &Web3Client, contract_address: Address) -> Result<Self> {
        let signer = web3.signer()?;
        Ok(Self {
            contract: CtbalLedger::new(contract_address, signer),
            confirmations: web3.config().confirmations,
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

/// Reverts are judged by their decoded reason; the raw revert data never
/// reaches message classification.
fn classify_contract_error<M: Middleware>(err: ContractError<M>) -> LedgerError {
    if err.is_revert() {
        let reason = err.decode_revert::<String>().unwrap_or_default();
        return LedgerError::new(classify_revert(&reason), err.to_string());
    }
    LedgerError::classify(err.to_string())
}

#[async_trait]
impl LedgerClient for ContractLedgerClient {
    async fn write(&self, submission: &Submission) -> Result<LedgerReceipt, LedgerError> {
        let call = self.contract.create_record(
            submission.label.clone(),
            submission.pseudo_identity,
            submission.content_digest.clone(),
            submission.metadata_digest.clone(),
            U256::from(submission.reward_amount),
        );

        let pending = call.send().await.map_err(classify_contract_error)?;
        let tx_hash = pending.tx_hash();
        debug!(
            source_index = submission.source_index,
            tx_hash = ?tx_hash,
            "createRecord sent"
        );

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| LedgerError::classify(e.to_string()))?;

        match receipt {
            None => Err(LedgerError::retryable(format!(
                "No receipt for transaction {:?}",
                tx_hash
            ))),
            Some(receipt) if receipt.status == Some(U64::zero()) => Err(LedgerError::permanent(
                format!("Transaction {:?} reverted", tx_hash),
            )),
            Some(receipt) => Ok(LedgerReceipt::from_receipt(&receipt)),
        }
    }

    async fn read_aggregate_count(&self) -> Result<u64, LedgerError> {
        let count = self
            .contract
            .get_record_count()
            .call()
            .await
            .map_err(classify_contract_error)?;
        Ok(count.low_u64())
    }
}
