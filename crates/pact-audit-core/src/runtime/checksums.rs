// pact-audit-core/src/runtime/checksums.rs
// ============================================================================
// Module: Pact Audit Checksum Verifier
// Description: Parses and verifies `checksums.sha256` against archive members.
// Purpose: Detect any archive member whose bytes were altered after packing.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! `checksums.sha256` is a line-oriented digest manifest: one
//! `<64 hex chars> <whitespace> <relative path>` line per covered file. A
//! single mismatch or unparseable line degrades the aggregate status without
//! aborting the scan, so a caller always sees every failure in one pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::core::pack::Archive;
use crate::core::pack::normalize_path;
use crate::core::report::ChecksumFailure;
use crate::core::report::ChecksumStatus;
use crate::core::report::ChecksumSummary;
use crate::runtime::Hasher;

static CHECKSUM_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-f0-9]{64})\s+(.+)$").expect("static pattern is valid"));

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies every line of `checksums.sha256` against the archive's members.
#[must_use]
pub fn verify_checksums(archive: &Archive, checksums_bytes: &[u8], hasher: &Hasher<'_>) -> ChecksumSummary {
    let text = String::from_utf8_lossy(checksums_bytes);
    let lines: Vec<&str> = text.lines().map(str::trim_end).filter(|line| !line.trim().is_empty()).collect();

    if lines.is_empty() {
        return ChecksumSummary {
            status: ChecksumStatus::Unavailable,
            checked_count: 0,
            total_count: 0,
            failures: Vec::new(),
        };
    }

    let mut checked_count = 0usize;
    let mut ordered_failures: Vec<(String, ChecksumFailure)> = Vec::new();

    for line in &lines {
        let Some(captures) = CHECKSUM_LINE_PATTERN.captures(line) else {
            ordered_failures.push((
                (*line).to_owned(),
                ChecksumFailure {
                    normalized_path: None,
                    message: format!("unparseable checksum line: {line:?}"),
                },
            ));
            continue;
        };
        let claimed_hex = &captures[1];
        let raw_path = &captures[2];
        let normalized = normalize_path(raw_path);

        match archive.get(&normalized) {
            Some(bytes) => {
                checked_count += 1;
                let computed_hex = hasher.digest(bytes).value;
                if !computed_hex.eq_ignore_ascii_case(claimed_hex) {
                    ordered_failures.push((
                        normalized.clone(),
                        ChecksumFailure {
                            normalized_path: Some(normalized.clone()),
                            message: format!("checksum mismatch for {normalized} (recorded: {claimed_hex}, computed: {computed_hex})"),
                        },
                    ));
                }
            }
            None => {
                ordered_failures.push((
                    normalized.clone(),
                    ChecksumFailure {
                        normalized_path: Some(normalized.clone()),
                        message: format!("checksum references missing file: {normalized}"),
                    },
                ));
            }
        }
    }

    ordered_failures.sort_by(|left, right| left.0.cmp(&right.0));
    let failures: Vec<ChecksumFailure> = ordered_failures.into_iter().map(|(_, failure)| failure).collect();

    let status = if failures.is_empty() { ChecksumStatus::Valid } else { ChecksumStatus::Invalid };

    ChecksumSummary { status, checked_count, total_count: lines.len(), failures }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
