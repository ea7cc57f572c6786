// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Input records
//!
//! Upstream files use whatever column names the scraper produced. Everything
//! downstream of this module sees the fixed [`RawRecord`] shape only.

pub mod normalize;
pub mod reader;
pub mod regions;

use serde::{Deserialize, Serialize};

pub use normalize::{canonical_column, normalize_row, Row};
pub use reader::{read_records, read_rows, InputFormat, ReaderError};
pub use regions::{normalize_region, region_from_filename, StateInfo, STATES, UNKNOWN_REGION};

/// One upstream record in fixed shape. All fields are opaque strings;
/// missing columns are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub name: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub birth_date: String,
    pub death_date: String,
    pub last_updated: String,
}

impl RawRecord {
    pub fn new(name: &str, state: &str, birth_date: &str, death_date: &str) -> Self {
        Self {
            name: name.to_string(),
            state: state.to_string(),
            birth_date: birth_date.to_string(),
            death_date: death_date.to_string(),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = city.to_string();
        self
    }

    pub fn with_county(mut self, county: &str) -> Self {
        self.county = county.to_string();
        self
    }

    pub fn with_last_updated(mut self, last_updated: &str) -> Self {
        self.last_updated = last_updated.to_string();
        self
    }
}
