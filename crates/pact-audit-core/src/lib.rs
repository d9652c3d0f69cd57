#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::missing_panics_doc,
        reason = "Test-only assertions are permitted."
    )
)]
// pact-audit-core/src/lib.rs
// ============================================================================
// Module: Pact Auditor Pack Verifier Core
// Description: Public API surface for the offline auditor-pack verifier.
// Purpose: Expose pack, transcript, and runtime verification types.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Pact Audit Core verifies auditor packs for the Pact negotiation/settlement
//! protocol entirely offline: it locates archive members, canonicalizes and
//! hashes JSON, verifies a signed hash-chained transcript, re-derives the
//! packed interpretive artifacts, and reduces every signal into a single
//! `Report`. The crate never performs network I/O and never reads wall-clock
//! time; every input is the archive byte buffer and the caller-supplied
//! [`runtime::VerifyOptions`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::artifacts::GcView;
pub use core::artifacts::InsurerSummary;
pub use core::artifacts::Judgment;
pub use core::hashing::DEFAULT_HASH_ALGORITHM;
pub use core::hashing::HashAlgorithm;
pub use core::hashing::HashDigest;
pub use core::hashing::HashError;
pub use core::manifest::Manifest;
pub use core::pack::Archive;
pub use core::pack::PackLoadError;
pub use core::pack::PackMalformedError;
pub use core::report::ChecksumStatus;
pub use core::report::ChecksumSummary;
pub use core::report::HashChainStatus;
pub use core::report::HashChainSummary;
pub use core::report::IntegrityResult;
pub use core::report::IntegrityStatus;
pub use core::report::Report;
pub use core::report::SignatureStatus;
pub use core::report::SignatureSummary;
pub use core::transcript::FailureEvent;
pub use core::transcript::Round;
pub use core::transcript::RoundType;
pub use core::transcript::Transcript;
pub use core::transcript::TranscriptError;
pub use runtime::VerifyOptions;
pub use runtime::render_outcome_line;
pub use runtime::verify;
