// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{DateTime, Datelike, NaiveDate};

use crate::records::RawRecord;

/// Age assumed when birth or terminal date cannot be read. Lands in the
/// Geriatric tier without the elevated sub-tier.
pub const DEFAULT_AGE: u32 = 75;

// Slash dates are read month-first; the scraped sources are US-formatted.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Parse an upstream date string. Returns `None` for anything that is not an
/// unambiguous calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Whole years between `birth` and `terminal`, clamped at zero
pub fn whole_years(birth: NaiveDate, terminal: NaiveDate) -> u32 {
    let mut years = terminal.year() - birth.year();
    if (terminal.month(), terminal.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Result of the age computation for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeAssessment {
    pub age: u32,
    pub birth: Option<NaiveDate>,
    pub terminal: Option<NaiveDate>,
    pub defaulted: bool,
}

/// Age at the record's terminal date: the death date, or the last-updated
/// date when the death date is missing or unreadable.
pub fn assess_age(record: &RawRecord) -> AgeAssessment {
    let birth = parse_date(&record.birth_date);
    let terminal = parse_date(&record.death_date).or_else(|| parse_date(&record.last_updated));

    match (birth, terminal) {
        (Some(b), Some(t)) => AgeAssessment {
            age: whole_years(b, t),
            birth,
            terminal,
            defaulted: false,
        },
        _ => AgeAssessment {
            age: DEFAULT_AGE,
            birth,
            terminal,
            defaulted: true,
        },
    }
}
