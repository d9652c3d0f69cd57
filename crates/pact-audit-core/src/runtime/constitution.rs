// pact-audit-core/src/runtime/constitution.rs
// ============================================================================
// Module: Pact Audit Constitution Gate
// Description: Normalizes and hashes the packed Constitution text and checks
//              it against the accepted standard text.
// Purpose: Distinguish packs built under the canonical rule set from those
//          built under some other, "non-standard", rule set.
// Dependencies: crate::runtime::Hasher
// ============================================================================

//! ## Overview
//! The Constitution's identity is the SHA-256 hash of its *normalized* text:
//! line endings collapsed to `\n` and trailing whitespace stripped from each
//! line, so a pack rebuilt on a different operating system or editor does
//! not spuriously fail this check. A hash that does not match the accepted
//! standard text is "non-standard"; whether that alone fails the pack
//! depends on the caller's `allow_nonstandard` option (spec section 4.9).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::runtime::Hasher;

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes Constitution text: CRLF becomes LF and trailing whitespace is
/// stripped from every line.
#[must_use]
pub fn normalize_constitution_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Outcome of comparing a packed Constitution against the accepted standard text.
#[derive(Debug, Clone)]
pub struct ConstitutionOutcome {
    /// `true` iff the packed text's normalized hash matches the standard text's.
    pub constitution_ok: bool,
    /// Hex-encoded hash of the packed, normalized Constitution text.
    pub packed_hash: String,
    /// Hex-encoded hash of the standard, normalized Constitution text.
    pub standard_hash: String,
    /// `NON_STANDARD_RULES: ...` mismatch message, present whenever the
    /// hashes differ regardless of `allow_nonstandard`.
    pub mismatch: Option<String>,
}

/// Checks a packed Constitution's text against the accepted standard text.
#[must_use]
pub fn check_constitution(packed_text: &[u8], standard_text: &[u8], hasher: &Hasher<'_>) -> ConstitutionOutcome {
    let normalized_packed = normalize_constitution_text(packed_text);
    let normalized_standard = normalize_constitution_text(standard_text);
    let packed_hash = hasher.digest(normalized_packed.as_bytes()).value;
    let standard_hash = hasher.digest(normalized_standard.as_bytes()).value;

    let constitution_ok = packed_hash == standard_hash;
    let mismatch = if constitution_ok {
        None
    } else {
        Some(format!(
            "NON_STANDARD_RULES: constitution hash mismatch (got {packed_hash}, expected {standard_hash})"
        ))
    };

    ConstitutionOutcome { constitution_ok, packed_hash, standard_hash, mismatch }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_crlf_and_strips_trailing_whitespace() {
        let normalized = normalize_constitution_text(b"line one   \r\nline two\r\n");
        assert_eq!(normalized, "line one\nline two");
    }

    #[test]
    fn matching_text_is_on_accept_list() {
        let hasher = Hasher::new(None);
        let outcome = check_constitution(b"Rule text\n", b"Rule text\n", &hasher);
        assert!(outcome.constitution_ok);
        assert!(outcome.mismatch.is_none());
    }

    #[test]
    fn differing_text_is_non_standard() {
        let hasher = Hasher::new(None);
        let outcome = check_constitution(b"Modified rule text\n", b"Rule text\n", &hasher);
        assert!(!outcome.constitution_ok);
        assert!(outcome.mismatch.unwrap().starts_with("NON_STANDARD_RULES"));
    }

    #[test]
    fn whitespace_only_differences_still_match() {
        let hasher = Hasher::new(None);
        let outcome = check_constitution(b"Rule text   \r\n", b"Rule text\n", &hasher);
        assert!(outcome.constitution_ok);
    }
}
