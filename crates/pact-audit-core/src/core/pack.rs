// pact-audit-core/src/core/pack.rs
// ============================================================================
// Module: Pact Audit Archive Reader
// Description: ZIP member resolution with canonical-path and fallback-pattern lookup.
// Purpose: Expose a deterministic, normalized view over an auditor-pack archive.
// Dependencies: zip, regex
// ============================================================================

//! ## Overview
//! An auditor pack is an ordinary ZIP archive. This module normalizes member
//! paths, rejects path traversal and duplicate members, and resolves the
//! seven logical pack members (manifest, checksums, constitution, transcript,
//! and the three derived artifacts) either by canonical path or by the first
//! fallback regex match, in the table order fixed by spec section 3.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Required Members
// ============================================================================

/// Logical identity of a required pack member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemberKey {
    /// `manifest.json`.
    Manifest,
    /// `checksums.sha256`.
    Checksums,
    /// `constitution/CONSTITUTION_v1.md`.
    Constitution,
    /// `input/transcript.json`.
    Transcript,
    /// `derived/gc_view.json`.
    GcView,
    /// `derived/judgment.json`.
    Judgment,
    /// `derived/insurer_summary.json`.
    InsurerSummary,
}

impl MemberKey {
    /// Canonical path preferred over any fallback pattern match.
    #[must_use]
    pub const fn canonical_path(self) -> &'static str {
        match self {
            Self::Manifest => "manifest.json",
            Self::Checksums => "checksums.sha256",
            Self::Constitution => "constitution/CONSTITUTION_v1.md",
            Self::Transcript => "input/transcript.json",
            Self::GcView => "derived/gc_view.json",
            Self::Judgment => "derived/judgment.json",
            Self::InsurerSummary => "derived/insurer_summary.json",
        }
    }

    /// Human-readable key name used in `PackLoadError` diagnostics.
    #[must_use]
    pub const fn diagnostic_name(self) -> &'static str {
        match self {
            Self::Manifest => "manifest.json",
            Self::Checksums => "checksums.sha256",
            Self::Constitution => "constitution/CONSTITUTION_v1.md",
            Self::Transcript => "input/transcript.json",
            Self::GcView => "derived/gc_view.json",
            Self::Judgment => "derived/judgment.json",
            Self::InsurerSummary => "derived/insurer_summary.json",
        }
    }

    /// All required keys, in the order the spec table lists them.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Manifest,
            Self::Checksums,
            Self::Constitution,
            Self::Transcript,
            Self::GcView,
            Self::Judgment,
            Self::InsurerSummary,
        ]
    }

    /// Fallback regex pattern tried when the canonical path is absent.
    fn fallback_pattern(self) -> &'static Regex {
        match self {
            Self::Manifest => &MANIFEST_PATTERN,
            Self::Checksums => &CHECKSUMS_PATTERN,
            Self::Constitution => &CONSTITUTION_PATTERN,
            Self::Transcript => &TRANSCRIPT_PATTERN,
            Self::GcView => &GC_VIEW_PATTERN,
            Self::Judgment => &JUDGMENT_PATTERN,
            Self::InsurerSummary => &INSURER_SUMMARY_PATTERN,
        }
    }
}

static MANIFEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^manifest\.json$").expect("static pattern is valid"));
static CHECKSUMS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"checksums.*\.sha256$").expect("static pattern is valid"));
static CONSTITUTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CONSTITUTION.*\.md$").expect("static pattern is valid"));
static TRANSCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"transcript.*\.json$").expect("static pattern is valid"));
static GC_VIEW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gc_view\.json$").expect("static pattern is valid"));
static JUDGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"judgment.*\.json$").expect("static pattern is valid"));
static INSURER_SUMMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"insurer_summary.*\.json$").expect("static pattern is valid"));

// ============================================================================
// SECTION: Archive
// ============================================================================

/// An opened, normalized view over an auditor-pack archive.
///
/// Every member is held fully in memory, keyed by its normalized path.
/// Normalized paths are sorted (`BTreeMap`) so iteration order is
/// deterministic, matching the ordering requirement in spec section 4.2.
#[derive(Debug, Clone)]
pub struct Archive {
    members: BTreeMap<String, Vec<u8>>,
}

impl Archive {
    /// Opens a ZIP archive from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PackMalformedError`] if the container cannot be read, if a
    /// member's normalized path escapes the archive root, or if two members
    /// normalize to the same path.
    pub fn open(archive_bytes: &[u8]) -> Result<Self, PackMalformedError> {
        let cursor = std::io::Cursor::new(archive_bytes);
        let mut zip = zip::ZipArchive::new(cursor)
            .map_err(|err| PackMalformedError::Unreadable(err.to_string()))?;

        let mut members = BTreeMap::new();
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|err| PackMalformedError::Unreadable(err.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let raw_name = entry.name().to_owned();
            let normalized = normalize_path(&raw_name);
            if normalized.split('/').any(|segment| segment == "..") {
                return Err(PackMalformedError::PathEscape(raw_name));
            }
            if members.contains_key(&normalized) {
                return Err(PackMalformedError::DuplicateMember(normalized));
            }
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut bytes)
                .map_err(|err| PackMalformedError::Unreadable(err.to_string()))?;
            members.insert(normalized, bytes);
        }
        Ok(Self { members })
    }

    /// Returns the normalized paths present in the archive, sorted ascending.
    #[must_use]
    pub fn member_paths(&self) -> Vec<&str> {
        self.members.keys().map(String::as_str).collect()
    }

    /// Returns a member's bytes by exact normalized path, if present.
    #[must_use]
    pub fn get(&self, normalized_path: &str) -> Option<&[u8]> {
        self.members.get(normalized_path).map(Vec::as_slice)
    }

    /// Resolves a required member by canonical path, falling back to the
    /// first member (in sorted-path order) whose normalized path matches the
    /// key's fallback pattern.
    #[must_use]
    pub fn resolve(&self, key: MemberKey) -> Option<ResolvedMember<'_>> {
        if let Some(bytes) = self.members.get(key.canonical_path()) {
            return Some(ResolvedMember {
                path: key.canonical_path(),
                bytes,
            });
        }
        let pattern = key.fallback_pattern();
        self.members
            .iter()
            .find(|(path, _)| pattern.is_match(path))
            .map(|(path, bytes)| ResolvedMember { path, bytes })
    }

    /// Resolves every required member, returning a [`PackLoadError`] listing
    /// every miss at once rather than failing on the first.
    ///
    /// # Errors
    ///
    /// Returns [`PackLoadError`] if one or more required members cannot be
    /// resolved.
    pub fn resolve_all(&self) -> Result<ResolvedPack<'_>, PackLoadError> {
        let mut missing = Vec::new();
        let mut resolved: BTreeMap<MemberKey, ResolvedMember<'_>> = BTreeMap::new();
        for key in MemberKey::all() {
            match self.resolve(key) {
                Some(member) => {
                    resolved.insert(key, member);
                }
                None => missing.push(key.diagnostic_name().to_owned()),
            }
        }
        if !missing.is_empty() {
            return Err(PackLoadError {
                missing,
                found_paths: self.member_paths().into_iter().map(str::to_owned).collect(),
            });
        }
        Ok(ResolvedPack { resolved })
    }
}

/// A single resolved archive member: its normalized path and borrowed bytes.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMember<'archive> {
    /// Normalized path the member was found at.
    pub path: &'archive str,
    /// Borrowed member bytes.
    pub bytes: &'archive [u8],
}

/// Every required pack member, resolved by logical key.
#[derive(Debug, Clone)]
pub struct ResolvedPack<'archive> {
    resolved: BTreeMap<MemberKey, ResolvedMember<'archive>>,
}

impl<'archive> ResolvedPack<'archive> {
    /// Returns the resolved member for a required key.
    ///
    /// # Panics
    ///
    /// Never panics in practice: every [`MemberKey`] is populated by
    /// [`Archive::resolve_all`] before a [`ResolvedPack`] is constructed.
    #[must_use]
    pub fn get(&self, key: MemberKey) -> ResolvedMember<'archive> {
        self.resolved
            .get(&key)
            .copied()
            .unwrap_or_else(|| unreachable!("resolve_all guarantees every key is present"))
    }
}

// ============================================================================
// SECTION: Path Normalization
// ============================================================================

/// Normalizes a raw archive entry name: backslashes become forward slashes
/// and a leading `./` is stripped.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let slashed = raw.replace('\\', "/");
    slashed.strip_prefix("./").unwrap_or(&slashed).to_owned()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal errors raised while opening or structurally validating an archive.
#[derive(Debug, Error)]
pub enum PackMalformedError {
    /// The ZIP container itself could not be parsed.
    #[error("archive is unreadable: {0}")]
    Unreadable(String),
    /// A member's normalized path escaped the archive root via `..`.
    #[error("member path escapes archive root: {0}")]
    PathEscape(String),
    /// Two entries normalized to the same path.
    #[error("duplicate normalized member path: {0}")]
    DuplicateMember(String),
}

/// Raised when one or more required pack members cannot be resolved.
#[derive(Debug, Error)]
#[error("missing required pack member(s): {missing:?}")]
pub struct PackLoadError {
    /// Diagnostic names of the required members that could not be resolved.
    pub missing: Vec<String>,
    /// Every normalized path actually present in the archive, for diagnosis.
    pub found_paths: Vec<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buffer);
            let mut writer = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, contents) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn normalize_path_converts_backslashes_and_strips_dot_slash() {
        assert_eq!(normalize_path("./a/b.json"), "a/b.json");
        assert_eq!(normalize_path("a\\b\\c.json"), "a/b/c.json");
    }

    #[test]
    fn open_rejects_path_traversal() {
        let bytes = build_zip(&[("../escape.json", b"{}")]);
        let result = Archive::open(&bytes);
        assert!(matches!(result, Err(PackMalformedError::PathEscape(_))));
    }

    #[test]
    fn resolve_prefers_canonical_path_over_pattern() {
        let bytes = build_zip(&[
            ("manifest.json", b"{}"),
            ("backups/manifest.json.bak", b"{}"),
        ]);
        let archive = Archive::open(&bytes).unwrap();
        let resolved = archive.resolve(MemberKey::Manifest).unwrap();
        assert_eq!(resolved.path, "manifest.json");
    }

    #[test]
    fn resolve_falls_back_to_pattern_match() {
        let bytes = build_zip(&[("custom/transcript.v2.json", b"{}")]);
        let archive = Archive::open(&bytes).unwrap();
        let resolved = archive.resolve(MemberKey::Transcript).unwrap();
        assert_eq!(resolved.path, "custom/transcript.v2.json");
    }

    #[test]
    fn resolve_all_reports_every_missing_key() {
        let bytes = build_zip(&[("manifest.json", b"{}")]);
        let archive = Archive::open(&bytes).unwrap();
        let error = archive.resolve_all().unwrap_err();
        assert_eq!(error.missing.len(), 6);
        assert!(error.found_paths.contains(&"manifest.json".to_owned()));
    }
}
