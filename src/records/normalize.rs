// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Column alias normalization
//!
//! Rows arrive as column → value maps with whatever headers the exporter
//! used. Each [`RawRecord`] field has an ordered alias list; the first alias
//! present with a non-empty value wins. Missing fields become empty strings
//! and are handled by the mapper's fallbacks.

use std::collections::HashMap;

use super::RawRecord;

/// A parsed input row keyed by canonical column name
pub type Row = HashMap<String, String>;

const NAME_ALIASES: &[&str] = &["name", "full_name", "fullname", "deceased", "memorial_name"];
const FIRST_NAME_ALIASES: &[&str] = &["first_name", "firstname", "given_name"];
const LAST_NAME_ALIASES: &[&str] = &["last_name", "lastname", "surname", "family_name"];
const CITY_ALIASES: &[&str] = &["city", "town", "locality", "death_city", "death_place_city"];
const COUNTY_ALIASES: &[&str] = &["county", "parish", "borough"];
const STATE_ALIASES: &[&str] = &["state", "region", "state_abbrev", "state_code", "province"];
const BIRTH_ALIASES: &[&str] = &["birth_date", "birthdate", "born", "date_of_birth", "dob", "birth"];
const DEATH_ALIASES: &[&str] = &["death_date", "deathdate", "died", "date_of_death", "dod", "death"];
const UPDATED_ALIASES: &[&str] = &[
    "last_updated",
    "updated",
    "updated_at",
    "last_modified",
    "modified",
];

/// Canonical form of a column header: trimmed, lower-case, with spaces and
/// hyphens folded to underscores. A leading UTF-8 BOM is dropped.
pub fn canonical_column(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

fn first_present(row: &Row, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        row.get(*alias)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Build a [`RawRecord`] from a row.
///
/// `default_region` fills the state when the row has none, typically the
/// region derived from the input file name.
pub fn normalize_row(row: &Row, default_region: Option<&str>) -> RawRecord {
    let name = first_present(row, NAME_ALIASES).unwrap_or_else(|| {
        let parts: Vec<String> = [
            first_present(row, FIRST_NAME_ALIASES),
            first_present(row, LAST_NAME_ALIASES),
        ]
        .into_iter()
        .flatten()
        .collect();
        parts.join(" ")
    });

    let state = first_present(row, STATE_ALIASES)
        .or_else(|| default_region.map(str::to_string))
        .unwrap_or_default();

    RawRecord {
        name,
        city: first_present(row, CITY_ALIASES).unwrap_or_default(),
        county: first_present(row, COUNTY_ALIASES).unwrap_or_default(),
        state,
        birth_date: first_present(row, BIRTH_ALIASES).unwrap_or_default(),
        death_date: first_present(row, DEATH_ALIASES).unwrap_or_default(),
        last_updated: first_present(row, UPDATED_ALIASES).unwrap_or_default(),
    }
}
