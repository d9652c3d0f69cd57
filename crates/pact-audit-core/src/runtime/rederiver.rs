// pact-audit-core/src/runtime/rederiver.rs
// ============================================================================
// Module: Pact Audit Rederivation Engine
// Description: Pure re-derivation of GC View, Judgment, and Insurer Summary
//              from a parsed transcript and the integrity signals already computed.
// Purpose: Produce the artifacts the packed ones are compared against.
// Dependencies: serde_json, crate::core::{artifacts, report, transcript}
// ============================================================================

//! ## Overview
//! The rederiver is a pure function of `(transcript, constitution identity,
//! hash-chain status, signature summary, constitution-gate outcome)`. It
//! never reads the packed artifacts; the comparator is the only place the
//! packed and re-derived artifacts meet. Two fields here are intentionally
//! underspecified by the governing rule set and are documented as pinned
//! design decisions rather than guessed per-call: `gc_takeaways.approval_risk`
//! is carried as an opaque, deterministic value compared only by hash, and
//! the `passportImpact` delta table below is the one rule set this verifier
//! implements and tests pin against.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::core::artifacts::CoverageDecision;
use crate::core::artifacts::FaultDomain;
use crate::core::artifacts::GcView;
use crate::core::artifacts::InsurerSummary;
use crate::core::artifacts::Judgment;
use crate::core::artifacts::PassportTier;
use crate::core::report::HashChainStatus;
use crate::core::report::SignatureStatus;
use crate::core::report::SignatureSummary;
use crate::core::transcript::RoundType;
use crate::core::transcript::Transcript;

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

/// Coarse classification of a transcript's terminal failure code, used only
/// to pick the GC View status and fault attribution. Only the two codes the
/// governing rule set documents by example are special-cased; any other
/// code is handled generically rather than guessed.
enum FailureClass {
    /// Codes in the `PACT-1xx` range: a policy-driven abort.
    PolicyAbort,
    /// `PACT-420`: the counterparty could not be reached.
    ProviderUnreachable,
    /// Any other failure code.
    Generic,
}

fn classify_failure_code(code: &str) -> FailureClass {
    if code == "PACT-420" {
        FailureClass::ProviderUnreachable
    } else if code.starts_with("PACT-1") {
        FailureClass::PolicyAbort
    } else {
        FailureClass::Generic
    }
}

// ============================================================================
// SECTION: GC Status
// ============================================================================

/// Closed-ish GC View executive-summary status: the two fixed variants the
/// rule set documents by example, plus a generic `FAILED_<CODE>` fallback
/// for failure codes outside that documented set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GcStatus {
    Completed,
    AbortedPolicy,
    FailedProviderUnreachable,
    FailedOther(String),
}

impl GcStatus {
    fn as_str(&self) -> String {
        match self {
            Self::Completed => "COMPLETED".to_owned(),
            Self::AbortedPolicy => "ABORTED_POLICY".to_owned(),
            Self::FailedProviderUnreachable => "FAILED_PROVIDER_UNREACHABLE".to_owned(),
            Self::FailedOther(code) => format!("FAILED_{code}"),
        }
    }
}

fn derive_gc_status(transcript: &Transcript) -> GcStatus {
    let terminal = transcript.terminal_round();
    if terminal.round_type == RoundType::Accept {
        return GcStatus::Completed;
    }
    let Some(failure_event) = &transcript.failure_event else {
        return GcStatus::FailedOther("UNSPECIFIED".to_owned());
    };
    match classify_failure_code(&failure_event.code) {
        FailureClass::PolicyAbort if terminal.round_type == RoundType::Abort => GcStatus::AbortedPolicy,
        FailureClass::ProviderUnreachable => GcStatus::FailedProviderUnreachable,
        _ => GcStatus::FailedOther(failure_event.code.replace('-', "_")),
    }
}

// ============================================================================
// SECTION: Fault, Passport Deltas, Confidence
// ============================================================================

/// Fault attribution, buyer/provider passport deltas, and confidence are
/// derived together because each depends on the same GC status decision.
struct Responsibility {
    fault_domain: FaultDomain,
    required_next_actor: &'static str,
    required_action: &'static str,
    buyer_delta: f64,
    provider_delta: f64,
    confidence: f64,
}

fn derive_responsibility(gc_status: &GcStatus, hash_chain_status: HashChainStatus, signatures: &SignatureSummary) -> Responsibility {
    if hash_chain_status == HashChainStatus::Invalid || signatures.status == SignatureStatus::Invalid {
        return Responsibility {
            fault_domain: FaultDomain::IndeterminateTamper,
            required_next_actor: "auditor",
            required_action: "investigate",
            buyer_delta: -0.50,
            provider_delta: -0.50,
            confidence: 0.0,
        };
    }

    let base_confidence = if signatures.status == SignatureStatus::Unverifiable { 0.5 } else { 1.0 };

    match gc_status {
        GcStatus::Completed => Responsibility {
            fault_domain: FaultDomain::NoFault,
            required_next_actor: "none",
            required_action: "none",
            buyer_delta: 0.25,
            provider_delta: 0.25,
            confidence: base_confidence,
        },
        GcStatus::AbortedPolicy => Responsibility {
            fault_domain: FaultDomain::BuyerAtFault,
            required_next_actor: "buyer",
            required_action: "remediate",
            buyer_delta: -0.10,
            provider_delta: 0.05,
            confidence: base_confidence,
        },
        GcStatus::FailedProviderUnreachable => Responsibility {
            fault_domain: FaultDomain::ProviderAtFault,
            required_next_actor: "provider",
            required_action: "restore_availability",
            buyer_delta: 0.05,
            provider_delta: -0.10,
            confidence: base_confidence,
        },
        GcStatus::FailedOther(_) => Responsibility {
            fault_domain: FaultDomain::NoFault,
            required_next_actor: "auditor",
            required_action: "review",
            buyer_delta: 0.0,
            provider_delta: 0.0,
            confidence: base_confidence * 0.75,
        },
    }
}

fn passport_tier(delta: f64) -> PassportTier {
    if delta >= 0.20 {
        PassportTier::A
    } else if delta >= -0.10 {
        PassportTier::B
    } else {
        PassportTier::C
    }
}

// ============================================================================
// SECTION: Coverage
// ============================================================================

/// Applies the coverage decision table (spec section 4.7.1).
#[allow(clippy::too_many_arguments, reason = "every branch of the coverage table is an independent input")]
fn derive_coverage(
    hash_chain_status: HashChainStatus,
    constitution_ok: bool,
    allow_nonstandard: bool,
    buyer_tier: PassportTier,
    provider_tier: PassportTier,
) -> (CoverageDecision, bool) {
    if hash_chain_status == HashChainStatus::Invalid {
        return (CoverageDecision::Excluded, false);
    }
    if !constitution_ok && !allow_nonstandard {
        return (CoverageDecision::Excluded, false);
    }
    if buyer_tier == PassportTier::C || provider_tier == PassportTier::C {
        return (CoverageDecision::EscrowRequired, true);
    }
    if buyer_tier == PassportTier::B || provider_tier == PassportTier::B {
        return (CoverageDecision::CoveredWithSurcharge, true);
    }
    (CoverageDecision::Covered, true)
}

// ============================================================================
// SECTION: Public Entry Point
// ============================================================================

/// Every artifact and classification signal a single re-derivation run produces.
pub struct RederivedArtifacts {
    /// Re-derived GC View.
    pub gc_view: GcView,
    /// Re-derived Judgment.
    pub judgment: Judgment,
    /// Re-derived Insurer Summary.
    pub insurer_summary: InsurerSummary,
    /// Coverage decision, surfaced separately for the human summary line.
    pub coverage: CoverageDecision,
    /// Fault attribution, surfaced separately for the human summary line.
    pub fault_domain: FaultDomain,
    /// GC View executive-summary status string, surfaced for the human summary line.
    pub gc_status: String,
    /// `true` iff the re-derived GC View considers money to have moved.
    pub money_moved: bool,
    /// Confidence in [0, 1], surfaced for the human summary line.
    pub confidence: f64,
}

/// Re-derives GC View, Judgment, and Insurer Summary from a parsed transcript
/// and the integrity signals already computed for it.
#[must_use]
pub fn rederive(
    transcript: &Transcript,
    constitution_version: &str,
    constitution_hash: &str,
    hash_chain_status: HashChainStatus,
    signatures: &SignatureSummary,
    constitution_ok: bool,
    allow_nonstandard: bool,
) -> RederivedArtifacts {
    let gc_status = derive_gc_status(transcript);
    let responsibility = derive_responsibility(&gc_status, hash_chain_status, signatures);
    let buyer_tier = passport_tier(responsibility.buyer_delta);
    let provider_tier = passport_tier(responsibility.provider_delta);
    let (coverage, _coverage_applies) =
        derive_coverage(hash_chain_status, constitution_ok, allow_nonstandard, buyer_tier, provider_tier);
    let confidence = if coverage == CoverageDecision::Excluded && !constitution_ok && !allow_nonstandard {
        0.0
    } else {
        responsibility.confidence
    };

    let terminal = transcript.terminal_round();
    let settlement_attempted = transcript
        .rounds
        .iter()
        .any(|round| matches!(round.round_type, RoundType::Ask | RoundType::Bid | RoundType::Counter));
    let money_moved = gc_status == GcStatus::Completed;

    let approval_risk = json!({
        "score": confidence,
        "basis": fault_domain_str(responsibility.fault_domain),
    });

    let timeline: Vec<Value> = transcript
        .rounds
        .iter()
        .map(|round| {
            json!({
                "round_number": round.round_number,
                "round_type": round_type_str(round.round_type),
                "timestamp_ms": round.timestamp_ms,
            })
        })
        .collect();

    let evidence_index: Vec<Value> = transcript
        .rounds
        .iter()
        .map(|round| json!({ "round_number": round.round_number, "envelope_hash": round.envelope_hash }))
        .collect();

    let gc_view = GcView::from_value(json!({
        "version": "pact-gc-view/1.0",
        "constitution": {
            "version": constitution_version,
            "hash": constitution_hash,
            "rules_applied": [],
        },
        "subject": { "intent_id": transcript.intent_id },
        "executive_summary": {
            "status": gc_status.as_str(),
            "what_happened": format!("{} rounds concluding in {}", transcript.rounds.len(), round_type_str(terminal.round_type)),
            "money_moved": money_moved,
            "final_outcome": gc_status.as_str(),
            "settlement_attempted": settlement_attempted,
        },
        "integrity": {
            "hash_chain": hash_chain_status_str(hash_chain_status),
            "signatures_verified": { "verified": signatures.verified_count, "total": signatures.total_count },
            "final_hash_validation": transcript.final_hash.is_some(),
            "notes": Vec::<Value>::new(),
        },
        "policy": { "constitution_ok": constitution_ok, "allow_nonstandard": allow_nonstandard },
        "responsibility": {
            "judgment": {
                "fault_domain": fault_domain_str(responsibility.fault_domain),
                "required_next_actor": responsibility.required_next_actor,
                "required_action": responsibility.required_action,
                "terminal": terminal.round_type.is_terminal(),
                "confidence": confidence,
            },
            "last_valid_signed_hash": terminal.round_hash.clone().unwrap_or_else(|| terminal.envelope_hash.clone()),
            "blame_explanation": blame_explanation(&gc_status),
        },
        "responsibility_trace": timeline.clone(),
        "gc_takeaways": { "approval_risk": approval_risk },
        "timeline": timeline,
        "evidence_index": evidence_index,
        "chain_of_custody": { "events": [] },
    }));

    let judgment = Judgment::from_value(json!({
        "version": "pact-judgment/1.0",
        "status": gc_status.as_str(),
        "failureCode": transcript.failure_event.as_ref().map(|event| event.code.clone()),
        "lastValidRound": terminal.round_number,
        "lastValidSummary": gc_status.as_str(),
        "lastValidHash": terminal.round_hash.clone().unwrap_or_else(|| terminal.envelope_hash.clone()),
        "requiredNextActor": responsibility.required_next_actor,
        "requiredAction": responsibility.required_action,
        "terminal": terminal.round_type.is_terminal(),
        "dblDetermination": fault_domain_str(responsibility.fault_domain),
        "passportImpact": { "buyer_delta": responsibility.buyer_delta, "provider_delta": responsibility.provider_delta },
        "confidence": confidence,
        "recommendation": responsibility.required_action,
        "evidenceRefs": Vec::<Value>::new(),
        "claimedEvidenceRefs": Vec::<Value>::new(),
        "notes": Vec::<Value>::new(),
        "recommendedActions": [responsibility.required_action],
    }));

    let insurer_summary = InsurerSummary::from_value(json!({
        "version": "pact-insurer-summary/1.0",
        "coverage": coverage_str(coverage),
        "risk_factors": {
            "buyer_tier": tier_str(buyer_tier),
            "provider_tier": tier_str(provider_tier),
        },
        "surcharges": Vec::<Value>::new(),
        "confidence": confidence,
    }));

    RederivedArtifacts {
        gc_view,
        judgment,
        insurer_summary,
        coverage,
        fault_domain: responsibility.fault_domain,
        gc_status: gc_status.as_str(),
        money_moved,
        confidence,
    }
}

fn blame_explanation(status: &GcStatus) -> &'static str {
    match status {
        GcStatus::Completed => "negotiation concluded with mutual acceptance",
        GcStatus::AbortedPolicy => "buyer aborted under a policy-coded failure event",
        GcStatus::FailedProviderUnreachable => "provider could not be reached to complete settlement",
        GcStatus::FailedOther(_) => "negotiation failed for a reason outside the documented rule set",
    }
}

fn round_type_str(round_type: RoundType) -> &'static str {
    match round_type {
        RoundType::Intent => "INTENT",
        RoundType::Ask => "ASK",
        RoundType::Bid => "BID",
        RoundType::Counter => "COUNTER",
        RoundType::Accept => "ACCEPT",
        RoundType::Reject => "REJECT",
        RoundType::Abort => "ABORT",
    }
}

pub(crate) fn fault_domain_str(fault_domain: FaultDomain) -> &'static str {
    match fault_domain {
        FaultDomain::NoFault => "NO_FAULT",
        FaultDomain::BuyerAtFault => "BUYER_AT_FAULT",
        FaultDomain::ProviderAtFault => "PROVIDER_AT_FAULT",
        FaultDomain::BuyerRailAtFault => "BUYER_RAIL_AT_FAULT",
        FaultDomain::ProviderRailAtFault => "PROVIDER_RAIL_AT_FAULT",
        FaultDomain::IndeterminateTamper => "INDETERMINATE_TAMPER",
    }
}

fn coverage_str(coverage: CoverageDecision) -> &'static str {
    match coverage {
        CoverageDecision::Covered => "COVERED",
        CoverageDecision::CoveredWithSurcharge => "COVERED_WITH_SURCHARGE",
        CoverageDecision::EscrowRequired => "ESCROW_REQUIRED",
        CoverageDecision::Excluded => "EXCLUDED",
    }
}

fn tier_str(tier: PassportTier) -> &'static str {
    match tier {
        PassportTier::A => "A",
        PassportTier::B => "B",
        PassportTier::C => "C",
    }
}

fn hash_chain_status_str(status: HashChainStatus) -> &'static str {
    match status {
        HashChainStatus::Valid => "VALID",
        HashChainStatus::Invalid => "INVALID",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
