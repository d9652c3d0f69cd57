// pact-audit-core/src/runtime/verdict.rs
// ============================================================================
// Module: Pact Audit Verdict Reducer
// Description: Folds every integrity signal into an IntegrityResult and Report.
// Purpose: Implement the signal combination table from spec section 4.10.
// Dependencies: crate::core::report
// ============================================================================

//! ## Overview
//! This is the only place spec section 4.10's table is encoded. Every other
//! module only ever produces one signal; the reducer is deliberately the
//! single point where those signals are combined into `VALID`, `TAMPERED`,
//! or `INDETERMINATE`, and into the narrow public [`Report`] contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::report::ChecksumStatus;
use crate::core::report::ChecksumSummary;
use crate::core::report::HashChainStatus;
use crate::core::report::HashChainSummary;
use crate::core::report::IntegrityResult;
use crate::core::report::IntegrityStatus;
use crate::core::report::Report;
use crate::core::report::SignatureStatus;
use crate::core::report::SignatureSummary;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Every signal the reducer needs, gathered from the earlier pipeline stages.
pub struct VerdictInputs {
    /// Checksum verification outcome.
    pub checksums: ChecksumSummary,
    /// Hash-chain verification outcome.
    pub hash_chain: HashChainSummary,
    /// Signature verification outcome.
    pub signatures: SignatureSummary,
    /// `true` iff every re-derived artifact matched its packed counterpart.
    pub recompute_ok: bool,
    /// `true` iff the packed Constitution's hash is on the accept list.
    pub constitution_ok: bool,
    /// Caller option: accept an off-list Constitution anyway.
    pub allow_nonstandard: bool,
    /// `true` iff the manifest's claimed `constitution_hash` matches the
    /// computed hash of the bundled Constitution text.
    pub manifest_hash_consistent: bool,
    /// Informational warnings: claimed-hash mismatches, missing optional
    /// artifacts. Never affects `status`. Pre-sorted by `OrderingKey`
    /// (round index, then normalized path, then first-emission order; spec
    /// section 5) — the caller sorts before building this, not `reduce`.
    pub warnings: Vec<String>,
    /// Hard-signal diagnostic strings, pre-sorted by `OrderingKey` the same
    /// way as `warnings` above, independent of which pipeline stage
    /// (checksums, hash chain, signatures, re-derivation, constitution,
    /// manifest) produced each one.
    pub mismatches: Vec<String>,
}

// ============================================================================
// SECTION: Reduction
// ============================================================================

/// Reduces every verification signal into an [`IntegrityResult`] and the
/// public [`Report`], following the table in spec section 4.10.
#[must_use]
pub fn reduce(inputs: VerdictInputs) -> (IntegrityResult, Report) {
    let VerdictInputs {
        checksums,
        hash_chain,
        signatures,
        recompute_ok,
        constitution_ok,
        allow_nonstandard,
        manifest_hash_consistent,
        warnings,
        mismatches,
    } = inputs;

    let status = if checksums.status == ChecksumStatus::Invalid {
        IntegrityStatus::Tampered
    } else if hash_chain.status == HashChainStatus::Invalid {
        IntegrityStatus::Tampered
    } else if signatures.status == SignatureStatus::Invalid {
        IntegrityStatus::Tampered
    } else if !recompute_ok {
        IntegrityStatus::Tampered
    } else if !manifest_hash_consistent {
        IntegrityStatus::Tampered
    } else if checksums.status == ChecksumStatus::Unavailable && signatures.status == SignatureStatus::Unverifiable {
        IntegrityStatus::Indeterminate
    } else if !constitution_ok && !allow_nonstandard {
        IntegrityStatus::Tampered
    } else {
        IntegrityStatus::Valid
    };

    let checksums_ok = checksums.status == ChecksumStatus::Valid;
    let ok = status == IntegrityStatus::Valid;

    let integrity = IntegrityResult { status, checksums, hash_chain, signatures, warnings };
    let report = Report::new(ok, checksums_ok, recompute_ok, mismatches);

    (integrity, report)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_inputs() -> VerdictInputs {
        VerdictInputs {
            checksums: ChecksumSummary { status: ChecksumStatus::Valid, checked_count: 1, total_count: 1, failures: vec![] },
            hash_chain: HashChainSummary { status: HashChainStatus::Valid, details: None },
            signatures: SignatureSummary { status: SignatureStatus::Valid, verified_count: 1, total_count: 1, failures: vec![] },
            recompute_ok: true,
            constitution_ok: true,
            allow_nonstandard: false,
            manifest_hash_consistent: true,
            warnings: vec![],
            mismatches: vec![],
        }
    }

    #[test]
    fn fully_clean_pack_is_valid() {
        let (integrity, report) = reduce(clean_inputs());
        assert_eq!(integrity.status, IntegrityStatus::Valid);
        assert!(report.ok);
        assert!(report.checksums_ok);
        assert!(report.recompute_ok);
    }

    #[test]
    fn invalid_checksums_always_wins_tamper_regardless_of_other_signals() {
        let mut inputs = clean_inputs();
        inputs.checksums.status = ChecksumStatus::Invalid;
        inputs.constitution_ok = false;
        inputs.allow_nonstandard = true;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Tampered);
        assert!(!report.ok);
    }

    #[test]
    fn broken_hash_chain_is_tamper() {
        let mut inputs = clean_inputs();
        inputs.hash_chain.status = HashChainStatus::Invalid;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Tampered);
        assert!(!report.ok);
    }

    #[test]
    fn mismatched_recomputation_is_tamper_with_recompute_ok_false() {
        let mut inputs = clean_inputs();
        inputs.recompute_ok = false;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Tampered);
        assert!(!report.recompute_ok);
    }

    #[test]
    fn no_checksums_and_unverifiable_signatures_is_indeterminate() {
        let mut inputs = clean_inputs();
        inputs.checksums.status = ChecksumStatus::Unavailable;
        inputs.signatures.status = SignatureStatus::Unverifiable;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Indeterminate);
        assert!(!report.ok);
    }

    #[test]
    fn non_standard_constitution_without_allowance_is_tamper_by_policy() {
        let mut inputs = clean_inputs();
        inputs.constitution_ok = false;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Tampered);
        assert!(!report.ok);
    }

    #[test]
    fn non_standard_constitution_with_allowance_can_still_be_valid() {
        let mut inputs = clean_inputs();
        inputs.constitution_ok = false;
        inputs.allow_nonstandard = true;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Valid);
        assert!(report.ok);
    }

    #[test]
    fn manifest_hash_inconsistency_is_tamper() {
        let mut inputs = clean_inputs();
        inputs.manifest_hash_consistent = false;
        let (integrity, report) = reduce(inputs);
        assert_eq!(integrity.status, IntegrityStatus::Tampered);
        assert!(!report.ok);
    }
}
