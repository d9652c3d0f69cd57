// pact-audit-core/src/core/manifest.rs
// ============================================================================
// Module: Pact Audit Manifest Type
// Description: Pack-level metadata record (`manifest.json`).
// Purpose: Carry the constitution identity and transcript linkage the rest of
//          verification cross-checks against.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `manifest.json` is the pack's table of contents: which transcript it
//! wraps, which Constitution version and hash it was built against, and when
//! and by what tool it was produced. The manifest's `constitution_hash` is
//! compared, not trusted: [`crate::runtime::constitution`] recomputes the
//! hash of the bundled Constitution text independently and treats a
//! manifest/file mismatch as a consistency failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Pack-level metadata from `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Identifier of the wrapped transcript.
    pub transcript_id: String,
    /// Version tag of the Constitution the pack was built against.
    pub constitution_version: String,
    /// Hex-encoded SHA-256 hash the manifest claims for the Constitution text.
    pub constitution_hash: String,
    /// Pack build time in milliseconds since epoch.
    pub created_at_ms: u64,
    /// Identifier and version of the tool that produced the pack.
    pub tool_version: String,
    /// Every field a pack producer included beyond the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure parsing `manifest.json`.
#[derive(Debug, Error)]
#[error("manifest json malformed: {0}")]
pub struct ManifestError(pub String);

// ============================================================================
// SECTION: Parsing
// ============================================================================

impl Manifest {
    /// Parses a manifest from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the bytes are not a valid manifest object.
    pub fn parse(bytes: &[u8]) -> Result<Self, ManifestError> {
        serde_json::from_slice(bytes).map_err(|err| ManifestError(err.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
