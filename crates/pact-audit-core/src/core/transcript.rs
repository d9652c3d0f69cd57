// pact-audit-core/src/core/transcript.rs
// ============================================================================
// Module: Pact Audit Transcript Types
// Description: Strictly-typed negotiation transcript with a raw-JSON escape hatch.
// Purpose: Parse `input/transcript.json` and reject structurally invalid packs.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The transcript is the one entity every other signal (hash chain,
//! signatures, re-derivation) is computed from. Fields this verifier reasons
//! about directly are typed; everything else a transcript producer may have
//! included is preserved under `extra` via `#[serde(flatten)]` so that
//! re-serializing a parsed round or transcript (minus a specific field, for
//! hash recomputation) reproduces byte-identical content for every field the
//! signer actually covered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// The only transcript version this verifier understands.
pub const EXPECTED_TRANSCRIPT_VERSION: &str = "pact-transcript/4.0";

// ============================================================================
// SECTION: Round Type
// ============================================================================

/// Closed enumeration of negotiation round kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundType {
    /// Opening intent to negotiate.
    Intent,
    /// A request for terms.
    Ask,
    /// An offer.
    Bid,
    /// A counter-offer.
    Counter,
    /// Terminal acceptance.
    Accept,
    /// Terminal rejection.
    Reject,
    /// Terminal abort.
    Abort,
}

impl RoundType {
    /// True for the three round types that terminate a negotiation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accept | Self::Reject | Self::Abort)
    }
}

// ============================================================================
// SECTION: Signature Block
// ============================================================================

/// A round's embedded signature envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    /// Base58-encoded 64-byte Ed25519 signature.
    pub signature_b58: String,
    /// Base58-encoded 32-byte Ed25519 public key, when carried in the signature block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_public_key_b58: Option<String>,
    /// Signature scheme identifier; only `ed25519` is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

// ============================================================================
// SECTION: Round
// ============================================================================

/// A single negotiation round within a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Zero-based position; must equal the round's index within `rounds`.
    pub round_number: u64,
    /// Kind of negotiation message this round carries.
    pub round_type: RoundType,
    /// Hex-encoded hash of the message the signature covers.
    pub envelope_hash: String,
    /// Hex-encoded hash this round links back to.
    pub previous_round_hash: String,
    /// Claimed hash of this round; advisory only, compared against the
    /// computed hash as a warning signal, never a tamper signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_hash: Option<String>,
    /// Embedded signature envelope, when the signer key travels with the signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlock>,
    /// Top-level signer public key, used when no `signature` block carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_b58: Option<String>,
    /// Milliseconds since epoch; must be non-decreasing across rounds.
    pub timestamp_ms: u64,
    /// Every field a transcript producer included beyond the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Round {
    /// Resolves the effective public key for signature verification: the
    /// signature block's key if present, else the round's top-level key.
    #[must_use]
    pub fn effective_public_key_b58(&self) -> Option<&str> {
        self.signature
            .as_ref()
            .and_then(|block| block.signer_public_key_b58.as_deref())
            .or(self.public_key_b58.as_deref())
    }

    /// Returns this round's canonical JSON value with `round_hash` removed,
    /// the exact object the per-round hash is computed over (spec section 4.4).
    #[must_use]
    pub fn value_without_round_hash(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.remove("round_hash");
        }
        value
    }
}

// ============================================================================
// SECTION: Failure Event
// ============================================================================

/// Optional terminal failure metadata attached to a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Producer-assigned failure code (e.g. `PACT-101`, `PACT-420`).
    pub code: String,
    /// Advisory prefix hash; mismatch is a warning, never tamper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_hash: Option<String>,
    /// Every field a transcript producer included beyond the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// A fully parsed, structurally-validated negotiation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Must equal [`EXPECTED_TRANSCRIPT_VERSION`].
    pub transcript_version: String,
    /// Seeds the chain's genesis hash together with `created_at_ms`.
    pub intent_id: String,
    /// Seeds the chain's genesis hash together with `intent_id`.
    pub created_at_ms: u64,
    /// Non-empty, densely zero-indexed sequence of rounds.
    pub rounds: Vec<Round>,
    /// Advisory top-level hash; mismatch is a warning, never tamper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_hash: Option<String>,
    /// Optional terminal failure metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_event: Option<FailureEvent>,
    /// Every field a transcript producer included beyond the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transcript {
    /// Returns the last round, the authority for terminal status derivation.
    ///
    /// # Panics
    ///
    /// Never panics on a transcript produced by [`TranscriptParser::parse`]:
    /// parsing rejects empty `rounds` before this accessor can be called.
    #[must_use]
    pub fn terminal_round(&self) -> &Round {
        self.rounds.last().unwrap_or_else(|| unreachable!("parse rejects empty rounds"))
    }

    /// Returns this transcript's canonical JSON value with `final_hash` removed.
    #[must_use]
    pub fn value_without_final_hash(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.remove("final_hash");
        }
        value
    }

    /// Returns this transcript's canonical JSON value with both `final_hash`
    /// and `failure_event` removed, the object `failure_event.transcript_hash`
    /// is computed over (spec section 4.4 step 7).
    #[must_use]
    pub fn value_without_final_hash_and_failure_event(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.remove("final_hash");
            map.remove("failure_event");
        }
        value
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural parse failures for `input/transcript.json`.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The JSON payload did not match the transcript shape at all.
    #[error("transcript json malformed: {0}")]
    Malformed(String),
    /// `transcript_version` did not equal the expected literal.
    #[error("unexpected transcript_version: {0}")]
    BadVersion(String),
    /// `rounds` was empty.
    #[error("transcript has no rounds")]
    EmptyRounds,
    /// A round's required fields were missing or mistyped beyond what
    /// deserialization alone rejects (reserved for future structural checks).
    #[error("round {0} has an invalid shape: {1}")]
    BadRoundShape(usize, String),
    /// `timestamp_ms` decreased between consecutive rounds.
    #[error("timestamp at round {index} is less than the previous round's timestamp")]
    NonMonotonicTimestamp {
        /// Index of the round whose timestamp regressed.
        index: usize,
    },
    /// `round_number` did not equal the round's zero-based position.
    #[error("round at position {position} has round_number {round_number}, expected {position}")]
    SparseRoundIndex {
        /// Zero-based position within `rounds`.
        position: usize,
        /// The round's claimed `round_number`.
        round_number: u64,
    },
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Strict JSON-to-typed-`Transcript` parser enforcing spec section 3's
/// structural invariants before the hash chain or signature checks run.
pub struct TranscriptParser;

impl TranscriptParser {
    /// Parses and structurally validates a transcript from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`TranscriptError`] variant naming the first invariant
    /// violated. Structural rejection alone is `INDETERMINATE`, never
    /// `TAMPERED`, per spec section 4.3.
    pub fn parse(bytes: &[u8]) -> Result<Transcript, TranscriptError> {
        let transcript: Transcript =
            serde_json::from_slice(bytes).map_err(|err| TranscriptError::Malformed(err.to_string()))?;
        Self::validate(&transcript)?;
        Ok(transcript)
    }

    /// Validates the structural invariants of an already-deserialized transcript.
    fn validate(transcript: &Transcript) -> Result<(), TranscriptError> {
        if transcript.transcript_version != EXPECTED_TRANSCRIPT_VERSION {
            return Err(TranscriptError::BadVersion(transcript.transcript_version.clone()));
        }
        if transcript.rounds.is_empty() {
            return Err(TranscriptError::EmptyRounds);
        }
        let mut previous_timestamp: Option<u64> = None;
        for (position, round) in transcript.rounds.iter().enumerate() {
            let expected_number = u64::try_from(position).unwrap_or(u64::MAX);
            if round.round_number != expected_number {
                return Err(TranscriptError::SparseRoundIndex {
                    position,
                    round_number: round.round_number,
                });
            }
            ensure_hex64(&round.envelope_hash)
                .map_err(|detail| TranscriptError::BadRoundShape(position, detail))?;
            ensure_hex64(&round.previous_round_hash)
                .map_err(|detail| TranscriptError::BadRoundShape(position, detail))?;
            if let Some(previous) = previous_timestamp {
                if round.timestamp_ms < previous {
                    return Err(TranscriptError::NonMonotonicTimestamp { index: position });
                }
            }
            previous_timestamp = Some(round.timestamp_ms);
        }
        Ok(())
    }
}

/// Validates that a string is exactly 64 lowercase hex characters.
fn ensure_hex64(value: &str) -> Result<(), String> {
    if crate::core::hashing::is_lowercase_hex_of_len(value, 64) {
        Ok(())
    } else {
        Err(format!("expected 64 lowercase hex characters, got {value:?}"))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
