// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::RawRecord;

pub const GERIATRIC_MIN_AGE: u32 = 75;
pub const ELEVATED_MIN_AGE: u32 = 80;
pub const MIDLIFE_MIN_AGE: u32 = 50;

pub const GERIATRIC_REWARD: u64 = 200;
pub const ELEVATED_REWARD: u64 = 250;
pub const MIDLIFE_REWARD: u64 = 300;
pub const EARLY_RISK_REWARD: u64 = 400;

/// Reward category by age at the terminal date. Rarer (younger) categories
/// carry the larger reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    EarlyRisk,
    MidLife,
    Geriatric,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EarlyRisk => "EarlyRisk",
            Category::MidLife => "MidLife",
            Category::Geriatric => "Geriatric",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub category: Category,
    pub elevated: bool,
    pub reward: u64,
}

/// Tier table, first match wins
pub fn tier_for_age(age: u32) -> Tier {
    if age >= GERIATRIC_MIN_AGE {
        let elevated = age >= ELEVATED_MIN_AGE;
        Tier {
            category: Category::Geriatric,
            elevated,
            reward: if elevated { ELEVATED_REWARD } else { GERIATRIC_REWARD },
        }
    } else if age >= MIDLIFE_MIN_AGE {
        Tier {
            category: Category::MidLife,
            elevated: false,
            reward: MIDLIFE_REWARD,
        }
    } else {
        Tier {
            category: Category::EarlyRisk,
            elevated: false,
            reward: EARLY_RISK_REWARD,
        }
    }
}

const VETERAN_KEYWORDS: &[&str] = &[
    "veteran",
    "national cemetery",
    "vfw",
    "american legion",
    "military",
];

/// Substring heuristic over name and city. This is a weak proxy with known
/// false positives and negatives: it only flags the label and never affects
/// the reward.
pub fn veteran_signal(record: &RawRecord) -> bool {
    let haystack = format!("{} {}", record.name, record.city).to_lowercase();
    VETERAN_KEYWORDS.iter().any(|k| haystack.contains(k))
}

/// Human-readable label, e.g. `Geriatric (Elevated) - FL`
pub fn build_label(tier: &Tier, veteran: bool, region: &str) -> String {
    let mut flags = Vec::new();
    if tier.elevated {
        flags.push("Elevated");
    }
    if veteran {
        flags.push("Veteran Signal");
    }

    if flags.is_empty() {
        format!("{} - {}", tier.category, region)
    } else {
        format!("{} ({}) - {}", tier.category, flags.join(", "), region)
    }
}
