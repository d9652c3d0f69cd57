// pact-audit-core/src/core/artifacts.rs
// ============================================================================
// Module: Pact Audit Derived Artifacts
// Description: GC View, Judgment, and Insurer Summary raw-JSON wrappers and
//              their closed-field-set comparator projections.
// Purpose: Give the rederiver a fixed vocabulary of enumerations to emit and
//          give the comparator a compile-time-enforced allow/deny list.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The three derived artifacts are producer-shaped JSON objects: this
//! verifier does not own their full schema, only the closed field sets
//! section 4.8 names for comparison and the closed enumerations its own
//! rederiver must emit into them. Each artifact is kept as a thin wrapper
//! around `serde_json::Value` — the "raw JSON layer" the design notes call
//! for — with a `strip` method that is the *only* path a packed artifact
//! takes into the comparator, so the allow/deny list cannot be bypassed by
//! accident.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Closed Enumerations
// ============================================================================

/// Fault attribution used by both the GC View's responsibility judgment and
/// the Judgment artifact's `dblDetermination` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultDomain {
    /// No party is at fault.
    NoFault,
    /// The buyer is at fault.
    BuyerAtFault,
    /// The provider is at fault.
    ProviderAtFault,
    /// The buyer's payment rail is at fault.
    BuyerRailAtFault,
    /// The provider's payment rail is at fault.
    ProviderRailAtFault,
    /// The transcript is too tampered to attribute fault.
    IndeterminateTamper,
}

/// Insurer Summary coverage decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageDecision {
    /// Covered without surcharge.
    Covered,
    /// Covered but with a risk surcharge applied.
    CoveredWithSurcharge,
    /// Coverage requires an escrow hold before payout.
    EscrowRequired,
    /// Not covered.
    Excluded,
}

/// Single-transcript passport risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassportTier {
    /// Passport delta >= 0.20.
    A,
    /// Passport delta >= -0.10.
    B,
    /// Passport delta below the B threshold.
    C,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure parsing a derived artifact from raw JSON bytes.
#[derive(Debug, Error)]
#[error("{kind} json malformed: {detail}")]
pub struct ArtifactError {
    /// Name of the artifact kind that failed to parse, for error context.
    pub kind: &'static str,
    /// Underlying parse failure detail.
    pub detail: String,
}

// ============================================================================
// SECTION: GC View
// ============================================================================

/// Raw-JSON wrapper around a GC View artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcView(Value);

impl GcView {
    /// Wraps an already-constructed JSON value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a GC View from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the bytes are not valid JSON.
    pub fn parse(bytes: &[u8]) -> Result<Self, ArtifactError> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|err| ArtifactError { kind: "gc_view", detail: err.to_string() })
    }

    /// Borrows the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Top-level keys kept verbatim from a GC View before comparison.
    pub const KEEP_KEYS: &'static [&'static str] = &[
        "version",
        "constitution",
        "gc_takeaways",
        "subject",
        "executive_summary",
        "integrity",
        "policy",
        "responsibility",
        "responsibility_trace",
        "evidence_index",
        "timeline",
    ];

    /// Produces the canonical comparison projection: the keep-listed keys
    /// verbatim, `chain_of_custody` with `evidence_bundle_hash` removed, and
    /// `appendix` dropped entirely (spec section 4.8).
    #[must_use]
    pub fn strip(&self) -> Value {
        let mut out = Map::new();
        if let Some(object) = self.0.as_object() {
            for key in Self::KEEP_KEYS {
                if let Some(value) = object.get(*key) {
                    out.insert((*key).to_owned(), value.clone());
                }
            }
            if let Some(chain_of_custody) = object.get("chain_of_custody") {
                let mut trimmed = chain_of_custody.clone();
                if let Value::Object(map) = &mut trimmed {
                    map.remove("evidence_bundle_hash");
                }
                out.insert("chain_of_custody".to_owned(), trimmed);
            }
        }
        Value::Object(out)
    }
}

// ============================================================================
// SECTION: Judgment
// ============================================================================

/// Raw-JSON wrapper around a Judgment artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment(Value);

impl Judgment {
    /// Wraps an already-constructed JSON value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a Judgment from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the bytes are not valid JSON.
    pub fn parse(bytes: &[u8]) -> Result<Self, ArtifactError> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|err| ArtifactError { kind: "judgment", detail: err.to_string() })
    }

    /// Borrows the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Closed field set kept from a Judgment before comparison; absent keys
    /// are simply omitted from the projection (spec section 4.8).
    pub const KEEP_KEYS: &'static [&'static str] = &[
        "version",
        "status",
        "failureCode",
        "lastValidRound",
        "lastValidSummary",
        "lastValidHash",
        "requiredNextActor",
        "requiredAction",
        "terminal",
        "dblDetermination",
        "passportImpact",
        "confidence",
        "recommendation",
        "evidenceRefs",
        "claimedEvidenceRefs",
        "notes",
        "recommendedActions",
    ];

    /// Produces the canonical comparison projection over the closed field set.
    #[must_use]
    pub fn strip(&self) -> Value {
        let mut out = Map::new();
        if let Some(object) = self.0.as_object() {
            for key in Self::KEEP_KEYS {
                if let Some(value) = object.get(*key) {
                    out.insert((*key).to_owned(), value.clone());
                }
            }
        }
        Value::Object(out)
    }
}

// ============================================================================
// SECTION: Insurer Summary
// ============================================================================

/// Raw-JSON wrapper around an Insurer Summary artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsurerSummary(Value);

impl InsurerSummary {
    /// Wraps an already-constructed JSON value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses an Insurer Summary from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the bytes are not valid JSON.
    pub fn parse(bytes: &[u8]) -> Result<Self, ArtifactError> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|err| ArtifactError { kind: "insurer_summary", detail: err.to_string() })
    }

    /// Borrows the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Keys dropped from an Insurer Summary before comparison: all of them
    /// are non-deterministic (generation provenance, timestamps, tool
    /// version) rather than content (spec section 4.8).
    pub const DROP_KEYS: &'static [&'static str] =
        &["generated_from", "created_at_ms", "issued_at_ms", "tool_version"];

    /// Produces the canonical comparison projection: every field except the
    /// non-deterministic drop-listed ones.
    #[must_use]
    pub fn strip(&self) -> Value {
        let mut out = self.0.as_object().cloned().unwrap_or_default();
        for key in Self::DROP_KEYS {
            out.remove(*key);
        }
        Value::Object(out)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gc_view_strip_drops_appendix_and_evidence_bundle_hash() {
        let view = GcView::from_value(serde_json::json!({
            "version": 1,
            "appendix": {"raw_log": "..."},
            "chain_of_custody": {"evidence_bundle_hash": "deadbeef", "events": []},
        }));
        let stripped = view.strip();
        assert!(stripped.get("appendix").is_none());
        let coc = stripped.get("chain_of_custody").unwrap();
        assert!(coc.get("evidence_bundle_hash").is_none());
        assert!(coc.get("events").is_some());
    }

    #[test]
    fn judgment_strip_keeps_only_closed_field_set() {
        let judgment = Judgment::from_value(serde_json::json!({
            "status": "done",
            "internal_debug_trace": "should be dropped",
        }));
        let stripped = judgment.strip();
        assert!(stripped.get("status").is_some());
        assert!(stripped.get("internal_debug_trace").is_none());
    }

    #[test]
    fn insurer_summary_strip_drops_non_deterministic_keys() {
        let summary = InsurerSummary::from_value(serde_json::json!({
            "coverage": "COVERED",
            "tool_version": "pact-audit 1.0.0",
            "created_at_ms": 1000,
        }));
        let stripped = summary.strip();
        assert!(stripped.get("coverage").is_some());
        assert!(stripped.get("tool_version").is_none());
        assert!(stripped.get("created_at_ms").is_none());
    }
}
