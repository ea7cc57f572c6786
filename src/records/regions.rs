// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Region used when a record carries no usable state
pub const UNKNOWN_REGION: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn state(abbreviation: &'static str, name: &'static str) -> StateInfo {
    StateInfo { abbreviation, name }
}

/// US states and territories covered by the scraper output
pub const STATES: &[StateInfo] = &[
    state("AL", "Alabama"),
    state("AK", "Alaska"),
    state("AZ", "Arizona"),
    state("AR", "Arkansas"),
    state("CA", "California"),
    state("CO", "Colorado"),
    state("CT", "Connecticut"),
    state("DE", "Delaware"),
    state("DC", "District of Columbia"),
    state("FL", "Florida"),
    state("GA", "Georgia"),
    state("HI", "Hawaii"),
    state("ID", "Idaho"),
    state("IL", "Illinois"),
    state("IN", "Indiana"),
    state("IA", "Iowa"),
    state("KS", "Kansas"),
    state("KY", "Kentucky"),
    state("LA", "Louisiana"),
    state("ME", "Maine"),
    state("MD", "Maryland"),
    state("MA", "Massachusetts"),
    state("MI", "Michigan"),
    state("MN", "Minnesota"),
    state("MS", "Mississippi"),
    state("MO", "Missouri"),
    state("MT", "Montana"),
    state("NE", "Nebraska"),
    state("NV", "Nevada"),
    state("NH", "New Hampshire"),
    state("NJ", "New Jersey"),
    state("NM", "New Mexico"),
    state("NY", "New York"),
    state("NC", "North Carolina"),
    state("ND", "North Dakota"),
    state("OH", "Ohio"),
    state("OK", "Oklahoma"),
    state("OR", "Oregon"),
    state("PA", "Pennsylvania"),
    state("PR", "Puerto Rico"),
    state("RI", "Rhode Island"),
    state("SC", "South Carolina"),
    state("SD", "South Dakota"),
    state("TN", "Tennessee"),
    state("TX", "Texas"),
    state("UT", "Utah"),
    state("VT", "Vermont"),
    state("VI", "Virgin Islands, U.S."),
    state("VA", "Virginia"),
    state("WA", "Washington"),
    state("WV", "West Virginia"),
    state("WI", "Wisconsin"),
    state("WY", "Wyoming"),
    state("NYC", "New York City"),
    state("AS", "American Samoa"),
    state("GU", "Guam"),
    state("MP", "Northern Mariana Islands"),
    state("UM", "United States Minor Outlying Islands"),
];

pub fn find_by_abbreviation(abbreviation: &str) -> Option<&'static StateInfo> {
    STATES
        .iter()
        .find(|s| s.abbreviation.eq_ignore_ascii_case(abbreviation))
}

pub fn find_by_name(name: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Normalize a free-form state/region value.
///
/// Full state names map to their postal abbreviation, anything else is
/// upper-cased with inner whitespace collapsed. Empty input yields
/// [`UNKNOWN_REGION`].
pub fn normalize_region(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return UNKNOWN_REGION.to_string();
    }
    if let Some(info) = find_by_name(&collapsed) {
        return info.abbreviation.to_string();
    }
    collapsed.to_uppercase()
}

fn prefix_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([A-Za-z]{2,3})_").ok())
        .as_ref()
}

/// Derive a default region from an input file name.
///
/// Scraper exports are named `FL_20251118_210521_us_recent_deaths.csv`; older
/// exports embed the state name instead (`florida_deaths.csv`,
/// `mortality_newyork.csv`).
pub fn region_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;

    if let Some(caps) = prefix_pattern().and_then(|p| p.captures(stem)) {
        if let Some(info) = find_by_abbreviation(&caps[1]) {
            return Some(info.abbreviation.to_string());
        }
    }

    let squashed: String = stem
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    // Longest names first so "westvirginia" is not read as "virginia"
    let mut candidates: Vec<&StateInfo> = STATES.iter().collect();
    candidates.sort_by_key(|s| std::cmp::Reverse(s.name.len()));
    candidates
        .into_iter()
        .find(|s| {
            let key: String = s
                .name
                .to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect();
            squashed.contains(&key)
        })
        .map(|s| s.abbreviation.to_string())
}
