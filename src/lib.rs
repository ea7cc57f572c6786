// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod mapper;
pub mod queue;
pub mod records;
pub mod version;

pub use checkpoint::{
    CheckpointError, CheckpointState, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore,
};
pub use config::{ChainConfig, ChainRegistry, PipelineConfig};
pub use contracts::{
    ContractLedgerClient, LedgerClient, LedgerError, LedgerErrorKind, LedgerReceipt,
    MockLedgerClient, Web3Client, Web3Config,
};
pub use engine::{
    EngineConfig, EngineError, Pacing, RecordOutcome, RecordState, RunStart, RunSummary,
    StartMode, SubmissionEngine,
};
pub use mapper::{map_all, map_record, Category, Submission};
pub use queue::{EngineRunner, IngestQueue, QueueEntry, QueueError, QueueReport, QueueStatus};
pub use records::{read_records, RawRecord};
