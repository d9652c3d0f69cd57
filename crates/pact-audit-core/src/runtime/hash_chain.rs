// pact-audit-core/src/runtime/hash_chain.rs
// ============================================================================
// Module: Pact Audit Hash Chain Verifier
// Description: Verifies genesis linkage and per-round hash chaining.
// Purpose: Detect hard-tamper linkage breaks while keeping claimed hashes advisory.
// Dependencies: crate::core::hashing, crate::core::transcript
// ============================================================================

//! ## Overview
//! A transcript's rounds form a hash chain seeded by a genesis hash derived
//! from `intent_id` and `created_at_ms`. Only a broken link — a round's
//! `previous_round_hash` failing to match the expected value — is a hard
//! tamper signal. A claimed `round_hash`, `final_hash`, or
//! `failure_event.transcript_hash` that disagrees with the recomputed value
//! is self-attested and therefore only ever a warning (spec section 4.4).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::hashing::canonical_json_bytes;
use crate::core::report::HashChainStatus;
use crate::core::report::HashChainSummary;
use crate::core::transcript::Transcript;
use crate::runtime::Hasher;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of running the hash-chain verifier over a parsed transcript.
#[derive(Debug, Clone)]
pub struct HashChainOutcome {
    /// Aggregate status and break details, for [`crate::core::report::IntegrityResult`].
    pub summary: HashChainSummary,
    /// Informational claimed-hash mismatch warnings, carrying the round
    /// context needed to place each one in the final diagnostic ordering
    /// (spec section 5).
    pub warnings: Vec<HashChainWarning>,
    /// Index of the round whose linkage broke, when `summary.status` is `Invalid`.
    pub broken_round: Option<usize>,
}

/// A single claimed-hash mismatch that does not break the chain.
#[derive(Debug, Clone)]
pub struct HashChainWarning {
    /// Round the claimed hash belongs to, when the mismatch is round-scoped
    /// rather than transcript-wide (`final_hash`, `failure_event.transcript_hash`).
    pub round_index: Option<usize>,
    /// Human-readable description of the mismatch.
    pub message: String,
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies the genesis hash, per-round linkage, and every advisory hash
/// field a transcript may carry.
pub fn verify_hash_chain(transcript: &Transcript, hasher: &Hasher<'_>) -> HashChainOutcome {
    let mut warnings = Vec::new();

    let mut genesis_input = Vec::with_capacity(transcript.intent_id.len() + 32);
    genesis_input.extend_from_slice(transcript.intent_id.as_bytes());
    genesis_input.push(b':');
    genesis_input.extend_from_slice(transcript.created_at_ms.to_string().as_bytes());
    let mut expected_prev = hasher.digest(&genesis_input).value;

    let mut chain_intact = true;
    let mut broken_round = None;

    for (index, round) in transcript.rounds.iter().enumerate() {
        if round.previous_round_hash != expected_prev {
            chain_intact = false;
            broken_round = Some(index);
            break;
        }

        let computed_bytes = canonical_json_bytes(&round.value_without_round_hash())
            .unwrap_or_default();
        let computed_round_hash = hasher.digest(&computed_bytes).value;

        if let Some(claimed) = &round.round_hash {
            if claimed != &computed_round_hash {
                warnings.push(HashChainWarning {
                    round_index: Some(index),
                    message: format!("round {index}: claimed round_hash does not match computed round_hash"),
                });
            }
        }

        expected_prev = round.round_hash.clone().unwrap_or(computed_round_hash);
    }

    if chain_intact {
        if let Some(final_hash) = &transcript.final_hash {
            let bytes = canonical_json_bytes(&transcript.value_without_final_hash()).unwrap_or_default();
            let computed = hasher.digest(&bytes).value;
            if final_hash != &computed {
                warnings.push(HashChainWarning {
                    round_index: None,
                    message: "claimed final_hash does not match computed final_hash".to_owned(),
                });
            }
        }

        if let Some(failure_event) = &transcript.failure_event {
            if let Some(transcript_hash) = &failure_event.transcript_hash {
                let bytes = canonical_json_bytes(&transcript.value_without_final_hash_and_failure_event())
                    .unwrap_or_default();
                let computed = hasher.digest(&bytes).value;
                if transcript_hash != &computed {
                    warnings.push(HashChainWarning {
                        round_index: None,
                        message: "claimed failure_event.transcript_hash does not match computed value".to_owned(),
                    });
                }
            }
        }
    }

    let summary = if chain_intact {
        HashChainSummary { status: HashChainStatus::Valid, details: None }
    } else {
        let index = broken_round.unwrap_or_default();
        HashChainSummary {
            status: HashChainStatus::Invalid,
            details: Some(format!(
                "round {index}: previous_round_hash does not link to the expected prior hash"
            )),
        }
    };

    HashChainOutcome { summary, warnings, broken_round }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::TranscriptParser;

    fn build_transcript_json(previous_round_hash_round_1: &str) -> String {
        format!(
            r#"{{
                "transcript_version": "pact-transcript/4.0",
                "intent_id": "intent-1",
                "created_at_ms": 1000,
                "rounds": [
                    {{
                        "round_number": 0,
                        "round_type": "INTENT",
                        "envelope_hash": "{a}",
                        "previous_round_hash": "{genesis}",
                        "timestamp_ms": 1000
                    }},
                    {{
                        "round_number": 1,
                        "round_type": "ACCEPT",
                        "envelope_hash": "{b}",
                        "previous_round_hash": "{link}",
                        "timestamp_ms": 2000
                    }}
                ]
            }}"#,
            a = "1".repeat(64),
            b = "2".repeat(64),
            genesis = genesis_hash_hex("intent-1", 1000),
            link = previous_round_hash_round_1,
        )
    }

    fn genesis_hash_hex(intent_id: &str, created_at_ms: u64) -> String {
        use sha2::Digest as _;
        let mut hasher = sha2::Sha256::new();
        hasher.update(intent_id.as_bytes());
        hasher.update(b":");
        hasher.update(created_at_ms.to_string().as_bytes());
        crate::core::hashing::hex_encode(&hasher.finalize())
    }

    fn round_hash_hex(transcript: &Transcript, index: usize) -> String {
        let bytes = canonical_json_bytes(&transcript.rounds[index].value_without_round_hash()).unwrap();
        use sha2::Digest as _;
        let mut hasher = sha2::Sha256::new();
        hasher.update(&bytes);
        crate::core::hashing::hex_encode(&hasher.finalize())
    }

    #[test]
    fn intact_chain_is_valid_with_no_warnings() {
        let genesis = genesis_hash_hex("intent-1", 1000);
        let json = build_transcript_json(&genesis);
        let mut transcript = TranscriptParser::parse(json.as_bytes()).unwrap();
        transcript.rounds[1].previous_round_hash = round_hash_hex(&transcript, 0);
        let hasher = Hasher::new(None);
        let outcome = verify_hash_chain(&transcript, &hasher);
        assert_eq!(outcome.summary.status, HashChainStatus::Valid);
        assert!(outcome.broken_round.is_none());
    }

    #[test]
    fn broken_link_is_reported_at_the_correct_round() {
        let genesis = genesis_hash_hex("intent-1", 1000);
        let json = build_transcript_json(&genesis);
        let mut transcript = TranscriptParser::parse(json.as_bytes()).unwrap();
        transcript.rounds[1].previous_round_hash = "f".repeat(64);
        let hasher = Hasher::new(None);
        let outcome = verify_hash_chain(&transcript, &hasher);
        assert_eq!(outcome.summary.status, HashChainStatus::Invalid);
        assert_eq!(outcome.broken_round, Some(1));
    }

    #[test]
    fn claimed_round_hash_mismatch_is_a_warning_not_a_break() {
        let genesis = genesis_hash_hex("intent-1", 1000);
        let json = build_transcript_json(&genesis);
        let mut transcript = TranscriptParser::parse(json.as_bytes()).unwrap();
        transcript.rounds[0].round_hash = Some("0".repeat(64));
        transcript.rounds[1].previous_round_hash = round_hash_hex(&transcript, 0);
        let hasher = Hasher::new(None);
        let outcome = verify_hash_chain(&transcript, &hasher);
        assert_eq!(outcome.summary.status, HashChainStatus::Valid);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
