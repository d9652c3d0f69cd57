// pact-audit-core/src/core/ordering.rs
// ============================================================================
// Module: Pact Audit Diagnostic Ordering
// Description: Deterministic sort key for diagnostics gathered across
//              independently computable verification sub-steps.
// Purpose: Give `failures[]`, `warnings[]`, and `mismatches[]` a stable,
//          reproducible order regardless of how sub-steps are scheduled.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Spec section 5 allows sub-steps to run in any order (or in parallel) but
//! requires the diagnostic strings a run produces to come out in the same
//! order every time: "sorted by round index, then by normalized path, then
//! by first-emission order within the step". [`OrderingKey`] is that sort
//! key, attached to a diagnostic at the point it is produced so the final
//! assembly in [`crate::runtime::verify`] only has to sort, never guess.
//!
//! `round_index` and `normalized_path` are `None` for diagnostics that are
//! not tied to a specific round or archive member (a constitution mismatch,
//! a manifest/constitution hash inconsistency). The derived [`Ord`] treats
//! `None` as less than any `Some`, so round/path-agnostic diagnostics sort
//! ahead of round- or path-tied ones; ties within either group fall back to
//! `emission_seq`, the order the diagnostic was produced in.

use std::cmp::Ordering;

// ============================================================================
// SECTION: Ordering Key
// ============================================================================

/// Deterministic sort key for a single diagnostic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingKey {
    /// Round index the diagnostic is tied to, if any.
    pub round_index: Option<usize>,
    /// Normalized archive member path the diagnostic is tied to, if any.
    pub normalized_path: Option<String>,
    /// Monotonic counter recording the order the diagnostic was produced in,
    /// used to break ties when `round_index` and `normalized_path` agree.
    pub emission_seq: usize,
}

impl OrderingKey {
    /// Builds a key for a diagnostic tied to neither a round nor a path.
    #[must_use]
    pub const fn untied(emission_seq: usize) -> Self {
        Self { round_index: None, normalized_path: None, emission_seq }
    }

    /// Builds a key for a diagnostic tied to a specific round.
    #[must_use]
    pub const fn for_round(round_index: usize, emission_seq: usize) -> Self {
        Self { round_index: Some(round_index), normalized_path: None, emission_seq }
    }

    /// Builds a key for a diagnostic tied to a specific normalized path.
    #[must_use]
    pub fn for_path(normalized_path: String, emission_seq: usize) -> Self {
        Self { round_index: None, normalized_path: Some(normalized_path), emission_seq }
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.round_index
            .cmp(&other.round_index)
            .then_with(|| self.normalized_path.cmp(&other.normalized_path))
            .then_with(|| self.emission_seq.cmp(&other.emission_seq))
    }
}

// ============================================================================
// SECTION: Sorting Helper
// ============================================================================

/// Sorts keyed diagnostics by [`OrderingKey`] and returns just the messages,
/// in the order spec section 5 requires.
#[must_use]
pub fn sorted_messages(mut entries: Vec<(OrderingKey, String)>) -> Vec<String> {
    entries.sort_by(|left, right| left.0.cmp(&right.0));
    entries.into_iter().map(|(_, message)| message).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
