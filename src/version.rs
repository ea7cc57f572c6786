// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the CTBAL ledger submitter

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-resumable-submission-2025-11-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "csv-ingest",
    "column-aliases",
    "tiered-rewards",
    "pseudo-identities",
    "cid-digests",
    "atomic-checkpoints",
    "resume",
    "adaptive-pacing",
    "retry-not-skip",
    "ingest-queue",
];

/// Supported chain IDs
pub const SUPPORTED_CHAINS: &[u64] = &[
    31337,    // Local Hardhat node
    11155111, // Sepolia
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("CTBAL Submitter {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info as JSON (printed by `ctbal-cli version`)
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
        "chains": SUPPORTED_CHAINS,
    })
}
