// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// How the engine must react to a failed ledger call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerErrorKind {
    /// Capacity or throttling signal: back off and retry the same record
    Retryable,
    /// Content or business-rule rejection: record the failure and move on
    Permanent,
    /// The ledger cannot be used at all: persist progress and abort
    Fatal,
}

impl fmt::Display for LedgerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerErrorKind::Retryable => write!(f, "retryable"),
            LedgerErrorKind::Permanent => write!(f, "permanent"),
            LedgerErrorKind::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ledger error: {message}")]
pub struct LedgerError {
    pub kind: LedgerErrorKind,
    pub message: String,
}

// Status codes are matched as whole tokens only, see `status_code_pattern`
const RETRYABLE_PATTERNS: &[&str] = &[
    "rate limit",
    "too many requests",
    "capacity",
    "quota exceeded",
    "limit exceeded",
    "timeout",
    "timed out",
    "temporarily unavailable",
    "service unavailable",
    "bad gateway",
    "nonce too low",
    "replacement transaction underpriced",
    "already known",
];
const RETRYABLE_STATUS_CODES: &[&str] = &["429", "502", "503"];

const FATAL_PATTERNS: &[&str] = &[
    "connection refused",
    "unreachable",
    "dns error",
    "unauthorized",
    "forbidden",
    "invalid api key",
    "insufficient funds for gas",
];
const FATAL_STATUS_CODES: &[&str] = &["401", "403"];

/// Markers of a contract-level rejection
const REVERT_MARKERS: &[&str] = &["revert"];

/// Revert reasons a capacity-limited contract uses to ask callers to slow down
const THROTTLING_REVERT_REASONS: &[&str] = &["rate limit", "too many requests", "capacity"];

fn hex_data_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"0x[0-9a-f]*").ok())
        .as_ref()
}

fn status_code_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b\d{3}\b").ok())
        .as_ref()
}

/// Lower-cased message with hex payloads (revert data, hashes, addresses)
/// blanked out, so their digits never read as status codes.
fn readable_text(message: &str) -> String {
    let lower = message.to_lowercase();
    match hex_data_pattern() {
        Some(pattern) => pattern.replace_all(&lower, " ").into_owned(),
        None => lower,
    }
}

fn has_status_code(text: &str, codes: &[&str]) -> bool {
    status_code_pattern()
        .map(|p| p.find_iter(text).any(|m| codes.contains(&m.as_str())))
        .unwrap_or(false)
}

/// Classify a contract revert reason. A revert is a business-rule
/// rejection unless the reason names a throttling condition.
pub fn classify_revert(reason: &str) -> LedgerErrorKind {
    let text = readable_text(reason);
    if THROTTLING_REVERT_REASONS.iter().any(|p| text.contains(p)) {
        LedgerErrorKind::Retryable
    } else {
        LedgerErrorKind::Permanent
    }
}

/// Classify a JSON-RPC or contract error message.
///
/// Reverts are classified by their reason alone. Otherwise fatal patterns
/// win over retryable ones: an unauthorized endpoint that also mentions a
/// timeout will not recover by waiting.
pub fn classify_message(message: &str) -> LedgerErrorKind {
    let text = readable_text(message);

    if REVERT_MARKERS.iter().any(|m| text.contains(m)) {
        return classify_revert(&text);
    }

    if FATAL_PATTERNS.iter().any(|p| text.contains(p)) || has_status_code(&text, FATAL_STATUS_CODES)
    {
        LedgerErrorKind::Fatal
    } else if RETRYABLE_PATTERNS.iter().any(|p| text.contains(p))
        || has_status_code(&text, RETRYABLE_STATUS_CODES)
    {
        LedgerErrorKind::Retryable
    } else {
        LedgerErrorKind::Permanent
    }
}

impl LedgerError {
    pub fn new(kind: LedgerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error whose kind is derived from the message text
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_message(&message),
            message,
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Retryable, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Permanent, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Fatal, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == LedgerErrorKind::Retryable
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == LedgerErrorKind::Fatal
    }
}
