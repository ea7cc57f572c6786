// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod client;
pub mod error;
pub mod ledger;
pub mod mock;
pub mod types;

pub use client::{Web3Client, Web3Config};
pub use error::{classify_message, classify_revert, LedgerError, LedgerErrorKind};
pub use ledger::ContractLedgerClient;
pub use mock::{MockLedgerClient, WriteRecord};
pub use types::{CtbalLedger, LedgerReceipt};

use async_trait::async_trait;

use crate::mapper::Submission;

/// Write/read contract of the external ledger.
///
/// `write` is not idempotent on the ledger side. Issuing the same confirmed
/// submission twice creates two records; callers own deduplication.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Create one ledger record for `submission`
    async fn write(&self, submission: &Submission) -> Result<LedgerReceipt, LedgerError>;

    /// Total records on the ledger. Best effort, used for verification only.
    async fn read_aggregate_count(&self) -> Result<u64, LedgerError>;
}
