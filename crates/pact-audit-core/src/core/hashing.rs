// pact-audit-core/src/core/hashing.rs
// ============================================================================
// Module: Pact Audit Canonical Hashing
// Description: RFC 8785 JSON canonicalization and content hashing utilities.
// Purpose: Provide deterministic hashes for transcripts, artifacts, and checksums.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Every hash-bearing signal in the verifier — the genesis hash, per-round
//! hashes, the derived-artifact comparison hash, and the constitution
//! identity hash — is computed over RFC 8785 (JCS) canonical JSON bytes so
//! hash equality never depends on map iteration order or incidental
//! whitespace. Binary payloads (checksum-covered archive members) are hashed
//! directly over their raw bytes instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for Pact auditor-pack artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing (the only algorithm this verifier supports).
    Sha256,
}

/// Default hash algorithm for Pact auditor-pack verification.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

/// Hashes the concatenation of two byte strings without an intermediate
/// allocation-visible boundary marker, matching the genesis-hash formula in
/// spec (`SHA-256(intent_id || ":" || ascii(created_at_ms))`): callers pass
/// already-delimited parts.
#[must_use]
pub fn hash_concat(algorithm: HashAlgorithm, parts: &[&[u8]]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            for part in parts {
                hasher.update(part);
            }
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Errors raised when decoding hex strings.
#[derive(Debug, Error)]
pub enum HexDecodeError {
    /// The input length was not a multiple of two.
    #[error("hex string has odd length")]
    OddLength,
    /// A byte pair contained a non-hex-digit character.
    #[error("invalid hex digit at byte {0}")]
    InvalidDigit(usize),
}

/// Decodes a lowercase-or-uppercase hex string into raw bytes.
///
/// # Errors
///
/// Returns [`HexDecodeError`] when the string has odd length or contains a
/// non-hex-digit character.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, HexDecodeError> {
    let bytes = text.as_bytes();
    if !bytes.len().is_multiple_of(2) {
        return Err(HexDecodeError::OddLength);
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for (index, pair) in bytes.chunks_exact(2).enumerate() {
        let high = hex_nibble(pair[0]).ok_or(HexDecodeError::InvalidDigit(index * 2))?;
        let low = hex_nibble(pair[1]).ok_or(HexDecodeError::InvalidDigit(index * 2 + 1))?;
        out.push((high << 4) | low);
    }
    Ok(out)
}

/// Checks whether a string is exactly `len` lowercase hex characters.
#[must_use]
pub fn is_lowercase_hex_of_len(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
}

/// Decodes a single ASCII hex digit into its nibble value.
fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips() {
        let bytes = [0x00, 0x0f, 0xab, 0xff];
        let encoded = hex_encode(&bytes);
        assert_eq!(encoded, "000fabff");
        assert_eq!(hex_decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn hex_decode_rejects_odd_length() {
        assert!(matches!(hex_decode("abc"), Err(HexDecodeError::OddLength)));
    }

    #[test]
    fn hex_decode_rejects_bad_digit() {
        assert!(matches!(hex_decode("zz"), Err(HexDecodeError::InvalidDigit(0))));
    }

    #[test]
    fn canonical_bytes_sort_object_keys() {
        let value = serde_json::json!({"b": 1, "a": 2});
        let bytes = canonical_json_bytes(&value).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn hash_bytes_is_deterministic() {
        let first = hash_bytes(HashAlgorithm::Sha256, b"hello");
        let second = hash_bytes(HashAlgorithm::Sha256, b"hello");
        assert_eq!(first, second);
    }

    #[test]
    fn is_lowercase_hex_of_len_rejects_uppercase() {
        assert!(!is_lowercase_hex_of_len("ABCDEF", 6));
        assert!(is_lowercase_hex_of_len("abcdef", 6));
        assert!(!is_lowercase_hex_of_len("abcdef", 5));
    }
}
