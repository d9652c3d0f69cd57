// pact-audit-core/src/runtime/mod.rs
// ============================================================================
// Module: Pact Audit Runtime Verification Pipeline
// Description: Hash-chain, signature, checksum, re-derivation, and verdict steps.
// Purpose: Carry archive bytes through every verification signal to a Report.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Everything in `runtime` is a pure function over `core` types plus the
//! caller-supplied [`VerifyOptions`]. No sub-verifier performs I/O or reads
//! wall-clock time; the only external primitive a caller can swap is the
//! SHA-256 implementation itself, via [`Sha256Fn`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod checksums;
pub mod comparator;
pub mod constitution;
pub mod hash_chain;
pub mod rederiver;
pub mod signatures;
pub mod verdict;
pub mod verify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use verify::VerifyOptions;
pub use verify::VerifyOutcome;
pub use verify::render_outcome_line;
pub use verify::verify;

// ============================================================================
// SECTION: Injectable Hasher
// ============================================================================

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_bytes;

/// Host-supplied SHA-256 primitive: takes arbitrary bytes, returns the raw
/// 32-byte digest. Exists so the same verification core can run under a host
/// where the primitive is only available asynchronously (the host computes
/// the digest itself and hands back the result through this synchronous
/// callback boundary); absent a host override, the built-in `sha2` digest is used.
pub type Sha256Fn = Box<dyn Fn(&[u8]) -> [u8; 32] + Send + Sync>;

/// Thin wrapper resolving every hash computation in the runtime pipeline
/// through either the host-supplied [`Sha256Fn`] or the built-in digest.
pub(crate) struct Hasher<'options> {
    sha256: Option<&'options Sha256Fn>,
}

impl<'options> Hasher<'options> {
    /// Builds a hasher bound to the caller's optional SHA-256 override.
    pub(crate) const fn new(sha256: Option<&'options Sha256Fn>) -> Self {
        Self { sha256 }
    }

    /// Hashes raw bytes, using the host override if one was supplied.
    pub(crate) fn digest(&self, bytes: &[u8]) -> HashDigest {
        match self.sha256 {
            Some(callback) => HashDigest::new(HashAlgorithm::Sha256, &callback(bytes)),
            None => hash_bytes(HashAlgorithm::Sha256, bytes),
        }
    }
}
