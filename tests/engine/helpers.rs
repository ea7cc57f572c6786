// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
#![allow(dead_code)]
use ctbal_submitter::{
    EngineConfig, MemoryCheckpointStore, MockLedgerClient, RawRecord, StartMode, SubmissionEngine,
};
use std::sync::Arc;

pub const SCENARIO_AGES: [u32; 12] = [30, 55, 76, 81, 45, 60, 77, 82, 20, 50, 70, 90];
pub const SCENARIO_REWARDS: [u64; 12] = [400, 300, 200, 250, 400, 300, 200, 250, 400, 300, 300, 250];

/// Record whose age at death is exactly `age`
pub fn record_with_age(age: u32, position: usize) -> RawRecord {
    RawRecord::new(
        &format!("Person {}", position),
        "Florida",
        &format!("{}-01-01", 2020 - age as i32),
        "2020-06-15",
    )
    .with_city("Tampa")
}

pub fn records_with_ages(ages: &[u32]) -> Vec<RawRecord> {
    ages.iter()
        .enumerate()
        .map(|(i, age)| record_with_age(*age, i))
        .collect()
}

pub fn uniform_records(count: usize) -> Vec<RawRecord> {
    (0..count).map(|i| record_with_age(40, i)).collect()
}

pub fn fresh(batch_size: u32, delay_millis: u64) -> StartMode {
    StartMode::Fresh {
        start_index: 0,
        batch_size,
        delay_millis,
    }
}

pub struct Harness {
    pub ledger: Arc<MockLedgerClient>,
    pub store: Arc<MemoryCheckpointStore>,
    pub engine: SubmissionEngine,
}

pub fn harness(config: EngineConfig) -> Harness {
    harness_with_store(config, MemoryCheckpointStore::new())
}

pub fn harness_with_store(config: EngineConfig, store: MemoryCheckpointStore) -> Harness {
    let ledger = Arc::new(MockLedgerClient::new());
    let store = Arc::new(store);
    let engine = SubmissionEngine::new(ledger.clone(), store.clone(), config);
    Harness {
        ledger,
        store,
        engine,
    }
}
