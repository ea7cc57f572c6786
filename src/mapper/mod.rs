// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Record Mapper
//!
//! Pure translation of one [`RawRecord`] at a 1-based source index into a
//! write-ready [`Submission`]. No I/O, never fails.
//!
//! ## Determinism
//! Every field is a function of `(record, source_index)` only. Re-mapping
//! the same record at the same index yields byte-identical
//! [`Submission::canonical_bytes`], which is what lets an interrupted run
//! regenerate the exact submission that may already be on the ledger.
//!
//! ## Privacy
//! The raw name never leaves the mapper. It only feeds the keccak seed of
//! the pseudo identity; both digests are computed over projections that
//! omit it.

pub mod age;
pub mod identity;
pub mod tier;

pub use age::{assess_age, parse_date, AgeAssessment, DEFAULT_AGE};
pub use identity::{digest_cid, pseudo_identity};
pub use tier::{build_label, tier_for_age, veteran_signal, Category, Tier};

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::records::{normalize_region, RawRecord};

/// Schema tag embedded in every metadata document
pub const METADATA_SCHEMA: &str = "ctbal.record.v1";

/// Derived, immutable write request for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub category: Category,
    pub elevated: bool,
    pub veteran_signal: bool,
    pub label: String,
    pub region: String,
    pub pseudo_identity: Address,
    pub content_digest: String,
    pub metadata_digest: String,
    pub reward_amount: u64,
    pub source_index: u64,
    pub age: u32,
    pub age_defaulted: bool,
}

impl Submission {
    /// Stable serialized form used for reconciliation and determinism checks
    pub fn canonical_bytes(&self) -> Vec<u8> {
        identity::canonical_json(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentProjection<'a> {
    schema: &'a str,
    city: String,
    county: String,
    region: &'a str,
    birth_date: String,
    terminal_date: String,
    age: u32,
    age_defaulted: bool,
    category: Category,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDocument<'a> {
    schema: &'a str,
    category: Category,
    label: &'a str,
    region: &'a str,
    reward: u64,
    source_index: u64,
}

fn trimmed(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a record at `source_index` (1-based) to its submission
pub fn map_record(record: &RawRecord, source_index: u64) -> Submission {
    let region = normalize_region(&record.state);
    let assessment = assess_age(record);
    let tier = tier_for_age(assessment.age);
    let veteran = veteran_signal(record);
    let label = build_label(&tier, veteran, &region);

    // Parsed dates are rendered ISO so equivalent spellings digest the same
    let birth_date = assessment
        .birth
        .map(|d| d.to_string())
        .unwrap_or_else(|| trimmed(&record.birth_date));
    let terminal_date = assessment
        .terminal
        .map(|d| d.to_string())
        .unwrap_or_default();

    let content = ContentProjection {
        schema: METADATA_SCHEMA,
        city: trimmed(&record.city),
        county: trimmed(&record.county),
        region: &region,
        birth_date,
        terminal_date,
        age: assessment.age,
        age_defaulted: assessment.defaulted,
        category: tier.category,
    };
    let content_digest = digest_cid(identity::RAW_CODEC, &identity::canonical_json(&content));

    let metadata = MetadataDocument {
        schema: METADATA_SCHEMA,
        category: tier.category,
        label: &label,
        region: &region,
        reward: tier.reward,
        source_index,
    };
    let metadata_digest = digest_cid(identity::JSON_CODEC, &identity::canonical_json(&metadata));

    Submission {
        category: tier.category,
        elevated: tier.elevated,
        veteran_signal: veteran,
        pseudo_identity: pseudo_identity(&record.name, &region, source_index),
        label,
        region,
        content_digest,
        metadata_digest,
        reward_amount: tier.reward,
        source_index,
        age: assessment.age,
        age_defaulted: assessment.defaulted,
    }
}

/// Map a whole input sequence; position `p` becomes source index `p + 1`
pub fn map_all(records: &[RawRecord]) -> Vec<Submission> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| map_record(record, position as u64 + 1))
        .collect()
}
