// pact-audit-core/src/runtime/verify.rs
// ============================================================================
// Module: Pact Audit Verify Entry Point
// Description: Top-level orchestration from archive bytes to a Report.
// Purpose: Wire every sub-verifier together in the order spec section 2 draws.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! [`verify`] is the single public entry point this crate exists to provide:
//! a pure function from archive bytes and [`VerifyOptions`] to a [`Report`],
//! with the full [`IntegrityResult`] and a handful of human-summary fields
//! surfaced alongside it in [`VerifyOutcome`]. No sub-verifier here aborts
//! the run on a recoverable failure; only an unreadable archive or an
//! unresolvable required member short-circuits before any signal is
//! computed, per spec section 7.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::artifacts::GcView;
use crate::core::artifacts::InsurerSummary;
use crate::core::artifacts::Judgment;
use crate::core::manifest::Manifest;
use crate::core::ordering::OrderingKey;
use crate::core::ordering::sorted_messages;
use crate::core::pack::Archive;
use crate::core::pack::MemberKey;
use crate::core::report::ChecksumStatus;
use crate::core::report::ChecksumSummary;
use crate::core::report::HashChainStatus;
use crate::core::report::HashChainSummary;
use crate::core::report::IntegrityResult;
use crate::core::report::Report;
use crate::core::report::SignatureStatus;
use crate::core::report::SignatureSummary;
use crate::core::transcript::TranscriptParser;
use crate::runtime::Hasher;
use crate::runtime::Sha256Fn;
use crate::runtime::checksums::verify_checksums;
use crate::runtime::comparator::ArtifactKind;
use crate::runtime::comparator::compare_gc_view;
use crate::runtime::comparator::compare_insurer_summary;
use crate::runtime::comparator::compare_judgment;
use crate::runtime::constitution::check_constitution;
use crate::runtime::hash_chain::verify_hash_chain;
use crate::runtime::rederiver::rederive;
use crate::runtime::signatures::verify_signatures;
use crate::runtime::verdict::VerdictInputs;
use crate::runtime::verdict::reduce;

/// Normalized path of the optional Merkle-digest anchor (spec section 3).
const MERKLE_DIGEST_PATH: &str = "derived/merkle_digest.json";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Caller-supplied verification options (spec section 6).
pub struct VerifyOptions {
    /// Accept a Constitution hash that is not on the compiled-in accept list.
    pub allow_nonstandard: bool,
    /// The canonical Constitution text this build's accept list is keyed to.
    pub standard_constitution_text: Vec<u8>,
    /// Optional host-supplied SHA-256 primitive; falls back to the built-in
    /// digest when absent.
    pub sha256: Option<Sha256Fn>,
}

impl VerifyOptions {
    /// Builds options from the standard Constitution text, with
    /// `allow_nonstandard` off and the built-in SHA-256 digest.
    #[must_use]
    pub const fn new(standard_constitution_text: Vec<u8>) -> Self {
        Self { allow_nonstandard: false, standard_constitution_text, sha256: None }
    }

    /// Sets whether an off-list Constitution hash is accepted.
    #[must_use]
    pub const fn with_allow_nonstandard(mut self, allow_nonstandard: bool) -> Self {
        self.allow_nonstandard = allow_nonstandard;
        self
    }

    /// Overrides the SHA-256 primitive with a host-supplied implementation.
    #[must_use]
    pub fn with_sha256(mut self, sha256: Sha256Fn) -> Self {
        self.sha256 = Some(sha256);
        self
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// The full result of a verification run: the public [`Report`] plus the
/// internal [`IntegrityResult`] and the human-summary fields spec section 7
/// requires (`OUTCOME — Money moved: ... — Judgment: ...`).
pub struct VerifyOutcome {
    /// The stable, public wire-format result.
    pub report: Report,
    /// The full internal signal breakdown.
    pub integrity: IntegrityResult,
    /// GC View executive-summary status string (e.g. `COMPLETED`).
    pub gc_status: String,
    /// Whether the re-derived GC View considers money to have moved.
    pub money_moved: bool,
    /// Re-derived fault attribution, as its wire string (e.g. `NO_FAULT`).
    pub fault_domain: String,
    /// Re-derived confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Builds a fatal, short-circuited outcome for an unreadable or
/// unresolvable pack: `INDETERMINATE`, `ok = false`, no signal breakdown
/// beyond the single diagnostic message (spec section 7).
fn fatal_outcome(message: String) -> VerifyOutcome {
    let integrity = IntegrityResult {
        status: crate::core::report::IntegrityStatus::Indeterminate,
        checksums: ChecksumSummary {
            status: ChecksumStatus::Unavailable,
            checked_count: 0,
            total_count: 0,
            failures: vec![],
        },
        hash_chain: HashChainSummary { status: HashChainStatus::Invalid, details: Some(message.clone()) },
        signatures: SignatureSummary {
            status: SignatureStatus::Unverifiable,
            verified_count: 0,
            total_count: 0,
            failures: vec![],
        },
        warnings: vec![],
    };
    VerifyOutcome {
        report: Report::new(false, false, false, vec![message]),
        integrity,
        gc_status: "INDETERMINATE".to_owned(),
        money_moved: false,
        fault_domain: "INDETERMINATE_TAMPER".to_owned(),
        confidence: 0.0,
    }
}

// ============================================================================
// SECTION: Verify
// ============================================================================

/// Verifies an auditor-pack archive entirely offline, producing a
/// [`VerifyOutcome`] carrying the stable [`Report`] plus the internal signal
/// breakdown. Never performs network I/O or reads wall-clock time.
#[must_use]
pub fn verify(archive_bytes: &[u8], options: &VerifyOptions) -> VerifyOutcome {
    let archive = match Archive::open(archive_bytes) {
        Ok(archive) => archive,
        Err(err) => return fatal_outcome(format!("PackMalformed: {err}")),
    };

    let resolved = match archive.resolve_all() {
        Ok(resolved) => resolved,
        Err(err) => {
            return fatal_outcome(format!(
                "MissingRequiredMember: missing {:?}; found paths {:?}",
                err.missing, err.found_paths
            ));
        }
    };

    let manifest = match Manifest::parse(resolved.get(MemberKey::Manifest).bytes) {
        Ok(manifest) => manifest,
        Err(err) => return fatal_outcome(format!("PackMalformed: manifest.json: {err}")),
    };

    let transcript = match TranscriptParser::parse(resolved.get(MemberKey::Transcript).bytes) {
        Ok(transcript) => transcript,
        Err(err) => return fatal_outcome(format!("TranscriptParseError: {err}")),
    };

    let packed_gc_view = match GcView::parse(resolved.get(MemberKey::GcView).bytes) {
        Ok(value) => value,
        Err(err) => return fatal_outcome(format!("PackMalformed: derived/gc_view.json: {err}")),
    };
    let packed_judgment = match Judgment::parse(resolved.get(MemberKey::Judgment).bytes) {
        Ok(value) => value,
        Err(err) => return fatal_outcome(format!("PackMalformed: derived/judgment.json: {err}")),
    };
    let packed_insurer_summary = match InsurerSummary::parse(resolved.get(MemberKey::InsurerSummary).bytes) {
        Ok(value) => value,
        Err(err) => return fatal_outcome(format!("PackMalformed: derived/insurer_summary.json: {err}")),
    };

    let hasher = Hasher::new(options.sha256.as_ref());

    let constitution = check_constitution(
        resolved.get(MemberKey::Constitution).bytes,
        &options.standard_constitution_text,
        &hasher,
    );
    let manifest_hash_consistent = manifest
        .constitution_hash
        .eq_ignore_ascii_case(&constitution.packed_hash);

    let hash_chain_outcome = verify_hash_chain(&transcript, &hasher);
    let signatures = verify_signatures(&transcript);
    let checksums = verify_checksums(&archive, resolved.get(MemberKey::Checksums).bytes, &hasher);

    let rederived = rederive(
        &transcript,
        &manifest.constitution_version,
        &constitution.packed_hash,
        hash_chain_outcome.summary.status,
        &signatures,
        constitution.constitution_ok,
        options.allow_nonstandard,
    );

    let gc_view_comparison = compare_gc_view(&packed_gc_view, &rederived.gc_view, &hasher);
    let judgment_comparison = compare_judgment(&packed_judgment, &rederived.judgment, &hasher);
    let insurer_summary_comparison =
        compare_insurer_summary(&packed_insurer_summary, &rederived.insurer_summary, &hasher);
    let recompute_ok =
        gc_view_comparison.matched && judgment_comparison.matched && insurer_summary_comparison.matched;

    // Each sub-step's diagnostics are collected with an `OrderingKey` and
    // sorted just before building `Report`, rather than relying on the
    // fixed order the steps above happen to run in (spec section 5): a
    // diagnostic's place in the final output depends only on its round
    // index and normalized path, never on which pipeline stage produced it.
    let mut mismatch_seq = 0usize;
    let mut keyed_mismatches: Vec<(OrderingKey, String)> = Vec::new();

    for failure in &checksums.failures {
        let key = failure.normalized_path.clone().map_or_else(
            || OrderingKey::untied(mismatch_seq),
            |path| OrderingKey::for_path(path, mismatch_seq),
        );
        keyed_mismatches.push((key, failure.message.clone()));
        mismatch_seq += 1;
    }

    if let Some(details) = &hash_chain_outcome.summary.details {
        let key = hash_chain_outcome
            .broken_round
            .map_or_else(|| OrderingKey::untied(mismatch_seq), |round| OrderingKey::for_round(round, mismatch_seq));
        keyed_mismatches.push((key, details.clone()));
        mismatch_seq += 1;
    }

    for failure in &signatures.failures {
        keyed_mismatches.push((OrderingKey::for_round(failure.round_index, mismatch_seq), failure.message.clone()));
        mismatch_seq += 1;
    }

    for (kind, comparison) in [
        (ArtifactKind::GcView, &gc_view_comparison),
        (ArtifactKind::Judgment, &judgment_comparison),
        (ArtifactKind::InsurerSummary, &insurer_summary_comparison),
    ] {
        if let Some(message) = &comparison.mismatch {
            keyed_mismatches.push((OrderingKey::for_path(kind.path().to_owned(), mismatch_seq), message.clone()));
            mismatch_seq += 1;
        }
    }

    if let Some(message) = &constitution.mismatch {
        keyed_mismatches.push((OrderingKey::untied(mismatch_seq), message.clone()));
        mismatch_seq += 1;
    }

    if !manifest_hash_consistent {
        keyed_mismatches.push((
            OrderingKey::untied(mismatch_seq),
            format!(
                "manifest constitution_hash does not match computed constitution hash (manifest: {}, computed: {})",
                manifest.constitution_hash, constitution.packed_hash
            ),
        ));
    }

    let mismatches = sorted_messages(keyed_mismatches);

    let mut warning_seq = 0usize;
    let mut keyed_warnings: Vec<(OrderingKey, String)> = Vec::new();

    for warning in &hash_chain_outcome.warnings {
        let key = warning.round_index.map_or_else(
            || OrderingKey::untied(warning_seq),
            |round| OrderingKey::for_round(round, warning_seq),
        );
        keyed_warnings.push((key, warning.message.clone()));
        warning_seq += 1;
    }

    if archive.get(MERKLE_DIGEST_PATH).is_none() {
        keyed_warnings.push((
            OrderingKey::untied(warning_seq),
            "missing optional artifact: derived/merkle_digest.json".to_owned(),
        ));
    }

    let warnings = sorted_messages(keyed_warnings);

    let (integrity, report) = reduce(VerdictInputs {
        checksums,
        hash_chain: hash_chain_outcome.summary,
        signatures,
        recompute_ok,
        constitution_ok: constitution.constitution_ok,
        allow_nonstandard: options.allow_nonstandard,
        manifest_hash_consistent,
        warnings,
        mismatches,
    });

    let fault_domain = crate::runtime::rederiver::fault_domain_str(rederived.fault_domain).to_owned();

    VerifyOutcome {
        report,
        integrity,
        gc_status: rederived.gc_status,
        money_moved: rederived.money_moved,
        fault_domain,
        confidence: rederived.confidence,
    }
}

// ============================================================================
// SECTION: Human Summary Line
// ============================================================================

/// Renders the deterministic human summary line spec section 7 requires:
/// `OUTCOME — Money moved: Y/N — Judgment: ... — Integrity: VALID|TAMPERED|INDETERMINATE — Confidence: 0.xx`.
#[must_use]
pub fn render_outcome_line(outcome: &VerifyOutcome) -> String {
    let money_moved = if outcome.money_moved { "Y" } else { "N" };
    let integrity = match outcome.integrity.status {
        crate::core::report::IntegrityStatus::Valid => "VALID",
        crate::core::report::IntegrityStatus::Tampered => "TAMPERED",
        crate::core::report::IntegrityStatus::Indeterminate => "INDETERMINATE",
    };
    format!(
        "OUTCOME \u{2014} Money moved: {money_moved} \u{2014} Judgment: {} \u{2014} Integrity: {integrity} \u{2014} Confidence: {:.2}",
        outcome.gc_status, outcome.confidence,
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signature;
    use ed25519_dalek::Signer;
    use ed25519_dalek::SigningKey;
    use sha2::Digest as _;
    use std::io::Write as _;

    const CONSTITUTION_TEXT: &[u8] = b"Rule text for the canonical constitution.\n";

    fn genesis_hash_hex(intent_id: &str, created_at_ms: u64) -> String {
        let mut hasher = sha2::Sha256::new();
        hasher.update(intent_id.as_bytes());
        hasher.update(b":");
        hasher.update(created_at_ms.to_string().as_bytes());
        crate::core::hashing::hex_encode(&hasher.finalize())
    }

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = sha2::Sha256::new();
        hasher.update(bytes);
        crate::core::hashing::hex_encode(&hasher.finalize())
    }

    /// Builds a minimal, internally-consistent, well-formed pack: one
    /// INTENT round followed by one signed ACCEPT round, with the derived
    /// artifacts generated by the same rederivation engine `verify` uses (so
    /// this fixture can never drift from `rederive`'s actual output shape),
    /// and checksums covering every member.
    fn build_valid_pack() -> Vec<u8> {
        let signing_key = SigningKey::from_bytes(&[9u8; 32]);
        let public_key_b58 = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();

        let intent_id = "intent-1";
        let created_at_ms = 1_000u64;
        let genesis = genesis_hash_hex(intent_id, created_at_ms);

        let round0_envelope = "1".repeat(64);
        let round0_message = crate::core::hashing::hex_decode(&round0_envelope).unwrap();
        let round0_signature: Signature = signing_key.sign(&round0_message);
        let round0_signature_b58 = bs58::encode(round0_signature.to_bytes()).into_string();

        let round0_json = format!(
            r#"{{"round_number":0,"round_type":"INTENT","envelope_hash":"{round0_envelope}","previous_round_hash":"{genesis}","timestamp_ms":1000,"signature":{{"signature_b58":"{round0_signature_b58}","signer_public_key_b58":"{public_key_b58}","scheme":"ed25519"}}}}"#
        );
        let round0_value: serde_json::Value = serde_json::from_str(&round0_json).unwrap();
        let round0_canonical = serde_jcs::to_vec(&round0_value).unwrap();
        let round0_hash = sha256_hex(&round0_canonical);

        let round1_envelope = "2".repeat(64);
        let round1_message = crate::core::hashing::hex_decode(&round1_envelope).unwrap();
        let round1_signature: Signature = signing_key.sign(&round1_message);
        let round1_signature_b58 = bs58::encode(round1_signature.to_bytes()).into_string();

        let round1_json = format!(
            r#"{{"round_number":1,"round_type":"ACCEPT","envelope_hash":"{round1_envelope}","previous_round_hash":"{round0_hash}","timestamp_ms":2000,"signature":{{"signature_b58":"{round1_signature_b58}","signer_public_key_b58":"{public_key_b58}","scheme":"ed25519"}}}}"#
        );

        let transcript_json = format!(
            r#"{{"transcript_version":"pact-transcript/4.0","intent_id":"{intent_id}","created_at_ms":{created_at_ms},"rounds":[{round0_json},{round1_json}]}}"#
        );
        let transcript = TranscriptParser::parse(transcript_json.as_bytes()).unwrap();

        let constitution_hash = sha256_hex(CONSTITUTION_TEXT);
        let manifest_json = format!(
            r#"{{"transcript_id":"t-1","constitution_version":"v1","constitution_hash":"{constitution_hash}","created_at_ms":{created_at_ms},"tool_version":"pact-audit-test 0.0.0"}}"#
        );

        let hasher = Hasher::new(None);
        let hash_chain_outcome = verify_hash_chain(&transcript, &hasher);
        let signatures = verify_signatures(&transcript);
        let constitution = check_constitution(CONSTITUTION_TEXT, CONSTITUTION_TEXT, &hasher);
        let rederived = rederive(
            &transcript,
            "v1",
            &constitution.packed_hash,
            hash_chain_outcome.summary.status,
            &signatures,
            constitution.constitution_ok,
            false,
        );
        let gc_view_bytes = serde_json::to_vec(rederived.gc_view.as_value()).unwrap();
        let judgment_bytes = serde_json::to_vec(rederived.judgment.as_value()).unwrap();
        let insurer_summary_bytes = serde_json::to_vec(rederived.insurer_summary.as_value()).unwrap();

        let mut buffer = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buffer);
            let mut writer = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);

            let members: Vec<(&str, &[u8])> = vec![
                ("manifest.json", manifest_json.as_bytes()),
                ("constitution/CONSTITUTION_v1.md", CONSTITUTION_TEXT),
                ("input/transcript.json", transcript_json.as_bytes()),
                ("derived/gc_view.json", &gc_view_bytes),
                ("derived/judgment.json", &judgment_bytes),
                ("derived/insurer_summary.json", &insurer_summary_bytes),
            ];

            let mut checksum_lines = String::new();
            for (name, bytes) in &members {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
                checksum_lines.push_str(&format!("{}  {name}\n", sha256_hex(bytes)));
            }
            writer.start_file("checksums.sha256", options).unwrap();
            writer.write_all(checksum_lines.as_bytes()).unwrap();

            writer.finish().unwrap();
        }
        buffer
    }

    fn default_options() -> VerifyOptions {
        VerifyOptions::new(CONSTITUTION_TEXT.to_vec())
    }

    #[test]
    fn well_formed_pack_verifies_as_valid() {
        let archive_bytes = build_valid_pack();
        let outcome = verify(&archive_bytes, &default_options());
        assert!(outcome.report.ok, "mismatches: {:?}", outcome.report.mismatches);
        assert!(outcome.report.checksums_ok);
        assert!(outcome.report.recompute_ok);
        assert_eq!(outcome.gc_status, "COMPLETED");
        assert!(outcome.money_moved);
    }

    #[test]
    fn single_byte_flip_in_a_checksummed_member_flips_ok_false() {
        let mut archive_bytes = build_valid_pack();
        let needle = b"COMPLETED";
        let position = archive_bytes.windows(needle.len()).position(|window| window == needle);
        if let Some(position) = position {
            archive_bytes[position] = b'X';
        }
        let outcome = verify(&archive_bytes, &default_options());
        assert!(!outcome.report.ok);
    }

    #[test]
    fn malformed_archive_is_indeterminate() {
        let outcome = verify(b"not a zip file", &default_options());
        assert_eq!(outcome.integrity.status, crate::core::report::IntegrityStatus::Indeterminate);
        assert!(!outcome.report.ok);
    }

    #[test]
    fn render_outcome_line_matches_the_fixed_template() {
        let archive_bytes = build_valid_pack();
        let outcome = verify(&archive_bytes, &default_options());
        let line = render_outcome_line(&outcome);
        assert!(line.starts_with("OUTCOME"));
        assert!(line.contains("Integrity: VALID"));
        assert!(line.contains("Money moved: Y"));
    }
}
