// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::prelude::*;
use serde::{Deserialize, Serialize};

abigen!(
    CtbalLedger,
    r#"[
        function createRecord(string label, address counterparty, string contentDigest, string metadataDigest, uint256 rewardAmount) returns (uint256)
        function getRecordCount() view returns (uint256)
        event RecordCreated(uint256 indexed recordId, address indexed counterparty, uint256 rewardAmount)
    ]"#
);

/// Acknowledgement of an accepted ledger write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

impl LedgerReceipt {
    pub fn from_receipt(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used,
        }
    }
}
