// pact-audit-core/src/runtime/signatures.rs
// ============================================================================
// Module: Pact Audit Signature Verifier
// Description: Ed25519 verification over each round's envelope hash.
// Purpose: Detect forged or missing signatures across the transcript.
// Dependencies: ed25519-dalek, bs58
// ============================================================================

//! ## Overview
//! Each round's signature covers the hex-decoded bytes of its
//! `envelope_hash`. A round with no resolvable public key is unverifiable
//! rather than invalid; a transcript where every round lacks a key is
//! `UNVERIFIABLE` overall, but a transcript mixing verifiable and
//! unverifiable rounds is treated as `INVALID`, the same as an outright
//! verification failure (spec section 4.5).

// ============================================================================
// SECTION: Imports
// ============================================================================

use ed25519_dalek::Signature;
use ed25519_dalek::VerifyingKey;

use crate::core::hashing::hex_decode;
use crate::core::report::SignatureFailure;
use crate::core::report::SignatureStatus;
use crate::core::report::SignatureSummary;
use crate::core::transcript::Round;
use crate::core::transcript::Transcript;

const SUPPORTED_SCHEME: &str = "ed25519";

// ============================================================================
// SECTION: Per-Round Outcome
// ============================================================================

/// Result of checking a single round's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RoundSignatureOutcome {
    Verified,
    Unverifiable,
    Failed,
}

/// Checks a single round's signature, returning its outcome and, for
/// non-`Verified` outcomes, a human-readable failure description.
fn verify_round_signature(index: usize, round: &Round) -> (RoundSignatureOutcome, Option<String>) {
    let Some(public_key_b58) = round.effective_public_key_b58() else {
        return (
            RoundSignatureOutcome::Unverifiable,
            Some(format!("round {index} ({:?}): no public key available", round.round_type)),
        );
    };

    if let Some(scheme) = round.signature.as_ref().and_then(|block| block.scheme.as_deref()) {
        if scheme != SUPPORTED_SCHEME {
            return (
                RoundSignatureOutcome::Failed,
                Some(format!("round {index} ({:?}): unsupported signature scheme {scheme:?}", round.round_type)),
            );
        }
    }

    let Some(signature_b58) = round.signature.as_ref().map(|block| block.signature_b58.as_str()) else {
        return (
            RoundSignatureOutcome::Unverifiable,
            Some(format!("round {index} ({:?}): no signature present", round.round_type)),
        );
    };

    let verification = decode_and_verify(public_key_b58, signature_b58, &round.envelope_hash);
    match verification {
        Ok(()) => (RoundSignatureOutcome::Verified, None),
        Err(detail) => (
            RoundSignatureOutcome::Failed,
            Some(format!("round {index} ({:?}): signature verification failed ({detail})", round.round_type)),
        ),
    }
}

/// Decodes the base58 signature and public key and the hex envelope hash,
/// then verifies the signature over the envelope hash bytes.
fn decode_and_verify(public_key_b58: &str, signature_b58: &str, envelope_hash: &str) -> Result<(), String> {
    let public_key_bytes = bs58::decode(public_key_b58)
        .into_vec()
        .map_err(|err| format!("invalid base58 public key: {err}"))?;
    let public_key_array: [u8; 32] = public_key_bytes
        .try_into()
        .map_err(|_| "public key is not 32 bytes".to_owned())?;
    let verifying_key = VerifyingKey::from_bytes(&public_key_array)
        .map_err(|err| format!("invalid public key: {err}"))?;

    let signature_bytes = bs58::decode(signature_b58)
        .into_vec()
        .map_err(|err| format!("invalid base58 signature: {err}"))?;
    let signature_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| "signature is not 64 bytes".to_owned())?;
    let signature = Signature::from_bytes(&signature_array);

    let message = hex_decode(envelope_hash).map_err(|err| format!("invalid envelope_hash hex: {err}"))?;

    verifying_key
        .verify_strict(&message, &signature)
        .map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Transcript-Level Verification
// ============================================================================

/// Verifies every round's signature and reduces the per-round outcomes into
/// a [`SignatureSummary`].
#[must_use]
pub fn verify_signatures(transcript: &Transcript) -> SignatureSummary {
    let total_count = transcript.rounds.len();
    let mut verified_count = 0usize;
    let mut unverifiable_count = 0usize;
    let mut any_failed = false;
    let mut failures = Vec::new();

    for (index, round) in transcript.rounds.iter().enumerate() {
        let (outcome, detail) = verify_round_signature(index, round);
        match outcome {
            RoundSignatureOutcome::Verified => verified_count += 1,
            RoundSignatureOutcome::Unverifiable => unverifiable_count += 1,
            RoundSignatureOutcome::Failed => any_failed = true,
        }
        if let Some(message) = detail {
            failures.push(SignatureFailure { round_index: index, message });
        }
    }

    let status = if any_failed {
        SignatureStatus::Invalid
    } else if unverifiable_count == total_count {
        SignatureStatus::Unverifiable
    } else if unverifiable_count > 0 {
        SignatureStatus::Invalid
    } else {
        SignatureStatus::Valid
    };

    SignatureSummary { status, verified_count, total_count, failures }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::TranscriptParser;
    use ed25519_dalek::Signer;
    use ed25519_dalek::SigningKey;

    fn signed_round_json(signing_key: &SigningKey, round_number: u64, previous_round_hash: &str) -> String {
        let envelope_hash = "a".repeat(64);
        let message = hex_decode(&envelope_hash).unwrap();
        let signature: Signature = signing_key.sign(&message);
        let signature_b58 = bs58::encode(signature.to_bytes()).into_string();
        let public_key_b58 = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();
        format!(
            r#"{{
                "round_number": {round_number},
                "round_type": "INTENT",
                "envelope_hash": "{envelope_hash}",
                "previous_round_hash": "{previous_round_hash}",
                "timestamp_ms": 1000,
                "signature": {{
                    "signature_b58": "{signature_b58}",
                    "signer_public_key_b58": "{public_key_b58}",
                    "scheme": "ed25519"
                }}
            }}"#
        )
    }

    fn transcript_with_round(round_json: &str) -> Transcript {
        let json = format!(
            r#"{{
                "transcript_version": "pact-transcript/4.0",
                "intent_id": "intent-1",
                "created_at_ms": 1000,
                "rounds": [{round_json}]
            }}"#
        );
        TranscriptParser::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn verified_signature_yields_valid_status() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let round_json = signed_round_json(&signing_key, 0, &"0".repeat(64));
        let transcript = transcript_with_round(&round_json);
        let summary = verify_signatures(&transcript);
        assert_eq!(summary.status, SignatureStatus::Valid);
        assert_eq!(summary.verified_count, 1);
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn missing_key_on_every_round_is_unverifiable() {
        let round_json = format!(
            r#"{{
                "round_number": 0,
                "round_type": "INTENT",
                "envelope_hash": "{hash}",
                "previous_round_hash": "{zero}",
                "timestamp_ms": 1000
            }}"#,
            hash = "a".repeat(64),
            zero = "0".repeat(64),
        );
        let transcript = transcript_with_round(&round_json);
        let summary = verify_signatures(&transcript);
        assert_eq!(summary.status, SignatureStatus::Unverifiable);
    }

    #[test]
    fn tampered_envelope_hash_fails_verification() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let round_json = signed_round_json(&signing_key, 0, &"0".repeat(64));
        let mut transcript = transcript_with_round(&round_json);
        transcript.rounds[0].envelope_hash = "b".repeat(64);
        let summary = verify_signatures(&transcript);
        assert_eq!(summary.status, SignatureStatus::Invalid);
        assert_eq!(summary.failures.len(), 1);
    }
}
