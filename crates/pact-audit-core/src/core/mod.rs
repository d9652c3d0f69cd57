// pact-audit-core/src/core/mod.rs
// ============================================================================
// Module: Pact Audit Core Types
// Description: Canonical pack, transcript, artifact, and report structures.
// Purpose: Provide stable, serializable types shared by every verification step.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for pack layout, transcript
//! shape, derived-artifact projections, and the verdict report. The
//! `runtime` module operates exclusively on these types; nothing in `core`
//! performs verification logic itself.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod artifacts;
pub mod hashing;
pub mod manifest;
pub mod ordering;
pub mod pack;
pub mod report;
pub mod transcript;
