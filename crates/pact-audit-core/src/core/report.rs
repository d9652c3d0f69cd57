// pact-audit-core/src/core/report.rs
// ============================================================================
// Module: Pact Audit Report Types
// Description: Integrity result and public wire-format Report.
// Purpose: Reduce every verification signal into the stable output contract.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`IntegrityResult`] is the full internal signal set a verification run
//! produces; [`Report`] is the narrow, stable wire contract section 6 fixes.
//! The two are kept distinct on purpose: internal tooling and the CLI's
//! human summary line need the full breakdown, but the wire format must
//! never grow fields silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Literal version tag of the `Report` wire format.
pub const REPORT_VERSION: &str = "auditor_pack_verify/1.0";

/// Identifier and semantic version of this verifier, used as `tool_version`.
pub const TOOL_VERSION: &str = "pact-audit 0.1.0";

// ============================================================================
// SECTION: Checksums
// ============================================================================

/// Aggregate status of the checksum verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChecksumStatus {
    /// Every checked member matched its declared digest.
    Valid,
    /// At least one member's digest did not match.
    Invalid,
    /// No checksum file was usable (no parseable lines).
    Unavailable,
}

/// Outcome of checksum verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumSummary {
    /// Aggregate status.
    pub status: ChecksumStatus,
    /// Number of lines successfully checked.
    pub checked_count: usize,
    /// Total number of non-empty lines in `checksums.sha256`.
    pub total_count: usize,
    /// Per-line failures, carrying the path context needed to place each
    /// one in the final diagnostic ordering (spec section 5).
    pub failures: Vec<ChecksumFailure>,
}

/// A single `checksums.sha256` line that failed to verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumFailure {
    /// Normalized archive member path the line refers to, when the line
    /// parsed far enough to name one.
    pub normalized_path: Option<String>,
    /// Human-readable description of the failure.
    pub message: String,
}

// ============================================================================
// SECTION: Hash Chain
// ============================================================================

/// Aggregate status of the hash-chain verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashChainStatus {
    /// Every round's linkage checked out.
    Valid,
    /// A round's linkage broke the chain.
    Invalid,
}

/// Outcome of hash-chain verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashChainSummary {
    /// Aggregate status.
    pub status: HashChainStatus,
    /// Description of the first break, when `status` is `Invalid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// Aggregate status of the signature verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignatureStatus {
    /// Every round verified.
    Valid,
    /// At least one round failed verification.
    Invalid,
    /// No round carried a usable public key.
    Unverifiable,
}

/// Outcome of signature verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSummary {
    /// Aggregate status.
    pub status: SignatureStatus,
    /// Number of rounds whose signature verified.
    pub verified_count: usize,
    /// Total number of rounds.
    pub total_count: usize,
    /// Per-round failures, carrying the round index needed to place each
    /// one in the final diagnostic ordering (spec section 5).
    pub failures: Vec<SignatureFailure>,
}

/// A single round whose signature did not verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureFailure {
    /// Index of the round the failure belongs to.
    pub round_index: usize,
    /// Human-readable description of the failure.
    pub message: String,
}

// ============================================================================
// SECTION: Integrity Result
// ============================================================================

/// Top-level integrity reduction over the three signal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    /// Every signal was clean and the pack is on-policy.
    Valid,
    /// A hard tamper signal was observed.
    Tampered,
    /// The pack could not be parsed far enough to judge tamper vs. clean.
    Indeterminate,
}

/// Full internal signal set produced by a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityResult {
    /// Top-level reduction.
    pub status: IntegrityStatus,
    /// Checksum verification outcome.
    pub checksums: ChecksumSummary,
    /// Hash-chain verification outcome.
    pub hash_chain: HashChainSummary,
    /// Signature verification outcome.
    pub signatures: SignatureSummary,
    /// Informational strings: claimed-hash mismatches, missing optional
    /// artifacts, constitution notes. Never flips `status`. Pre-sorted by
    /// `OrderingKey` (spec section 5).
    pub warnings: Vec<String>,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// The stable, public wire-format verification result (spec section 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Literal wire-format version tag, always [`REPORT_VERSION`].
    pub version: String,
    /// Overall pass/fail: `true` iff the pack is `VALID` and on-policy.
    pub ok: bool,
    /// `true` iff every checksum matched.
    pub checksums_ok: bool,
    /// `true` iff every re-derived artifact matched the packed one.
    pub recompute_ok: bool,
    /// Every mismatch or policy-violation string observed, pre-sorted by
    /// `OrderingKey` (spec section 5: round index, then normalized path,
    /// then first-emission order).
    pub mismatches: Vec<String>,
    /// Identifier and version of the tool that produced this report.
    pub tool_version: String,
}

impl Report {
    /// Builds a report with [`REPORT_VERSION`] and [`TOOL_VERSION`] already filled in.
    #[must_use]
    pub fn new(ok: bool, checksums_ok: bool, recompute_ok: bool, mismatches: Vec<String>) -> Self {
        Self {
            version: REPORT_VERSION.to_owned(),
            ok,
            checksums_ok,
            recompute_ok,
            mismatches,
            tool_version: TOOL_VERSION.to_owned(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_new_fills_in_version_constants() {
        let report = Report::new(true, true, true, vec![]);
        assert_eq!(report.version, REPORT_VERSION);
        assert_eq!(report.tool_version, TOOL_VERSION);
    }

    #[test]
    fn report_serializes_with_expected_field_names() {
        let report = Report::new(false, true, false, vec!["x".to_owned()]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], serde_json::json!(false));
        assert_eq!(value["checksums_ok"], serde_json::json!(true));
        assert_eq!(value["recompute_ok"], serde_json::json!(false));
        assert_eq!(value["mismatches"], serde_json::json!(["x"]));
    }
}
