// pact-audit-core/src/runtime/comparator.rs
// ============================================================================
// Module: Pact Audit Artifact Comparator
// Description: Strip-then-canonicalize-then-hash comparison of derived artifacts.
// Purpose: Decide whether a packed derived artifact matches its re-derivation.
// Dependencies: crate::core::{artifacts, hashing}
// ============================================================================

//! ## Overview
//! The comparator never looks at a derived artifact's raw bytes: every
//! packed artifact passes through its [`crate::core::artifacts`] `strip`
//! method first, so the closed field set or key-drop list from spec section
//! 4.8 is the only thing that can reach the hash. Canonicalization happens
//! after stripping, never before, so a "pretty-printed" or field-order
//! difference in either the packed or re-derived side can never produce a
//! false mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::hashing::canonical_json_bytes;
use crate::runtime::Hasher;

// ============================================================================
// SECTION: Artifact Kind
// ============================================================================

/// Identifies which derived artifact a comparison covers, for diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `derived/gc_view.json`.
    GcView,
    /// `derived/judgment.json`.
    Judgment,
    /// `derived/insurer_summary.json`.
    InsurerSummary,
}

impl ArtifactKind {
    /// Canonical path used in mismatch diagnostics.
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::GcView => "derived/gc_view.json",
            Self::Judgment => "derived/judgment.json",
            Self::InsurerSummary => "derived/insurer_summary.json",
        }
    }
}

// ============================================================================
// SECTION: Comparison Outcome
// ============================================================================

/// Result of comparing one packed artifact against its re-derivation.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    /// `true` iff the stripped-and-canonicalized hashes matched.
    pub matched: bool,
    /// `derived/<name>.json mismatch after canonicalization (...)` when not matched.
    pub mismatch: Option<String>,
}

/// Number of leading hex characters shown in a truncated hash diagnostic.
const HASH_PREVIEW_LEN: usize = 12;

/// Truncates a hex digest to a short diagnostic preview.
fn preview(hash: &str) -> &str {
    hash.get(..HASH_PREVIEW_LEN).unwrap_or(hash)
}

/// Compares a packed artifact's stripped projection against the re-derived
/// artifact's stripped projection, hashing both after canonicalization.
#[must_use]
pub fn compare_stripped(
    kind: ArtifactKind,
    packed_stripped: &Value,
    rederived_stripped: &Value,
    hasher: &Hasher<'_>,
) -> ComparisonOutcome {
    let packed_bytes = canonical_json_bytes(packed_stripped).unwrap_or_default();
    let rederived_bytes = canonical_json_bytes(rederived_stripped).unwrap_or_default();
    let packed_hash = hasher.digest(&packed_bytes).value;
    let rederived_hash = hasher.digest(&rederived_bytes).value;

    let matched = packed_hash == rederived_hash;
    let mismatch = if matched {
        None
    } else {
        Some(format!(
            "{} mismatch after canonicalization (recomputed: {}\u{2026}, original: {}\u{2026})",
            kind.path(),
            preview(&rederived_hash),
            preview(&packed_hash),
        ))
    };

    ComparisonOutcome { matched, mismatch }
}

/// Compares a packed GC View against its re-derivation.
#[must_use]
pub fn compare_gc_view(
    packed: &crate::core::artifacts::GcView,
    rederived: &crate::core::artifacts::GcView,
    hasher: &Hasher<'_>,
) -> ComparisonOutcome {
    compare_stripped(ArtifactKind::GcView, &packed.strip(), &rederived.strip(), hasher)
}

/// Compares a packed Judgment against its re-derivation.
#[must_use]
pub fn compare_judgment(
    packed: &crate::core::artifacts::Judgment,
    rederived: &crate::core::artifacts::Judgment,
    hasher: &Hasher<'_>,
) -> ComparisonOutcome {
    compare_stripped(ArtifactKind::Judgment, &packed.strip(), &rederived.strip(), hasher)
}

/// Compares a packed Insurer Summary against its re-derivation.
#[must_use]
pub fn compare_insurer_summary(
    packed: &crate::core::artifacts::InsurerSummary,
    rederived: &crate::core::artifacts::InsurerSummary,
    hasher: &Hasher<'_>,
) -> ComparisonOutcome {
    compare_stripped(ArtifactKind::InsurerSummary, &packed.strip(), &rederived.strip(), hasher)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::GcView;
    use crate::core::artifacts::Judgment;

    #[test]
    fn matching_projections_compare_equal_regardless_of_key_order() {
        let packed = GcView::from_value(serde_json::json!({"version": 1, "subject": {"a": 1, "b": 2}}));
        let rederived = GcView::from_value(serde_json::json!({"subject": {"b": 2, "a": 1}, "version": 1}));
        let hasher = Hasher::new(None);
        let outcome = compare_gc_view(&packed, &rederived, &hasher);
        assert!(outcome.matched);
        assert!(outcome.mismatch.is_none());
    }

    #[test]
    fn differing_projections_report_a_mismatch_naming_the_artifact_path() {
        let packed = Judgment::from_value(serde_json::json!({"status": "COMPLETED"}));
        let rederived = Judgment::from_value(serde_json::json!({"status": "FAILED_OTHER"}));
        let hasher = Hasher::new(None);
        let outcome = compare_judgment(&packed, &rederived, &hasher);
        assert!(!outcome.matched);
        let message = outcome.mismatch.unwrap();
        assert!(message.starts_with("derived/judgment.json mismatch after canonicalization"));
    }

    #[test]
    fn fields_outside_the_strip_projection_never_affect_the_comparison() {
        let packed = GcView::from_value(serde_json::json!({
            "version": 1,
            "appendix": {"raw_log": "anything at all"},
        }));
        let rederived = GcView::from_value(serde_json::json!({
            "version": 1,
            "appendix": {"raw_log": "a completely different value"},
        }));
        let hasher = Hasher::new(None);
        let outcome = compare_gc_view(&packed, &rederived, &hasher);
        assert!(outcome.matched);
    }
}
