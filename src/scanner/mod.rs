//! Lockfile extraction and scanning.
//!
//! This module provides the [`LockfileExtractor`] trait, the two extraction
//! strategies, and [`LockfileScanner`], which runs one lockfile through
//! extraction and matching.
//!
//! # Available Extractors
//!
//! | Extractor | Format | Lockfiles |
//! |-----------|--------|-----------|
//! | [`JsonTreeExtractor`] | [`LockfileFormat::JsonTree`] | `package-lock.json`, `npm-shrinkwrap.json` |
//! | [`TextExtractor`] | [`LockfileFormat::LineOriented`] | `pnpm-lock.yaml`, `yarn.lock` |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lockscan::scanner::{LockfileFormat, LockfileScanner};
//! use lockscan::{AffectedRecord, CandidatePair, VulnerabilityIndex};
//!
//! let index = VulnerabilityIndex::build(vec![AffectedRecord::new("left-pad", "1.3.0")]);
//! let scanner = LockfileScanner::new(Arc::new(index));
//!
//! let lockfile = "  'left-pad':\n    specifier: ^1.3.0\n    version: 1.3.0\n";
//! let matches = scanner
//!     .scan_content("pnpm-lock.yaml", LockfileFormat::LineOriented, lockfile)
//!     .unwrap();
//!
//! assert_eq!(matches, vec![CandidatePair::new("left-pad", "1.3.0")]);
//! ```

mod discover;
mod json_tree;
mod text;

pub use discover::{discover_lockfiles, DEFAULT_EXCLUDE_DIRS, DEFAULT_LOCKFILE_NAMES};
pub use json_tree::JsonTreeExtractor;
pub use text::{ImportScanner, ImportState, TextExtractor};

use crate::checker::{find_matches, VulnerabilityChecker, VulnerabilityIndex};
use crate::error::ScanError;
use crate::model::{CandidatePair, MatchResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Extraction strategy for a lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockfileFormat {
    /// JSON document with `packages` and/or `dependencies` trees.
    JsonTree,
    /// YAML-like text scanned line by line.
    LineOriented,
}

impl LockfileFormat {
    /// Chooses a format from the file extension alone.
    ///
    /// `.json` files are parsed as JSON; everything else is scanned as text.
    /// A misnamed file is not an error, it just yields fewer candidates.
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => LockfileFormat::JsonTree,
            _ => LockfileFormat::LineOriented,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LockfileFormat::JsonTree => "json-tree",
            LockfileFormat::LineOriented => "line-oriented",
        }
    }
}

impl std::fmt::Display for LockfileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for recovering `(name, version)` pairs from lockfile text.
pub trait LockfileExtractor: Send + Sync {
    /// Returns the human-readable name of this extractor.
    fn name(&self) -> &'static str;

    fn format(&self) -> LockfileFormat;

    /// Extracts candidates in the order they are found. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::LockfileParse`] if the content cannot be parsed
    /// at all. `label` identifies the lockfile in the error.
    fn extract(&self, content: &str, label: &str) -> Result<Vec<CandidatePair>, ScanError>;
}

/// Returns the extractor for a format.
pub fn get_extractor(format: LockfileFormat) -> Box<dyn LockfileExtractor> {
    match format {
        LockfileFormat::JsonTree => Box::new(JsonTreeExtractor),
        LockfileFormat::LineOriented => Box::new(TextExtractor),
    }
}

/// Scans lockfiles against a shared, read-only checker.
///
/// Cloning is cheap and every scan keeps its own state, so clones can run on
/// separate threads.
pub struct LockfileScanner<C: ?Sized = VulnerabilityIndex> {
    checker: Arc<C>,
}

impl<C: ?Sized> Clone for LockfileScanner<C> {
    fn clone(&self) -> Self {
        Self {
            checker: Arc::clone(&self.checker),
        }
    }
}

impl<C: VulnerabilityChecker + ?Sized> LockfileScanner<C> {
    pub fn new(checker: Arc<C>) -> Self {
        Self { checker }
    }

    /// Extracts and matches already-loaded lockfile content.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::LockfileParse`] when JSON content is malformed.
    pub fn scan_content(
        &self,
        label: &str,
        format: LockfileFormat,
        content: &str,
    ) -> Result<Vec<CandidatePair>, ScanError> {
        let extractor = get_extractor(format);
        let candidates = extractor.extract(content, label)?;

        tracing::debug!(
            lockfile = label,
            extractor = extractor.name(),
            format = %extractor.format(),
            candidates = candidates.len(),
            "extracted candidates"
        );

        let matches = find_matches(candidates, self.checker.as_ref());
        tracing::debug!(
            lockfile = label,
            checker = self.checker.name(),
            matches = matches.len(),
            "matched candidates"
        );

        Ok(matches)
    }

    /// Reads and scans one lockfile.
    ///
    /// Read and parse failures are logged and recorded on the returned
    /// [`MatchResult`] with no matches, so one bad file never stops a run.
    pub fn scan_file(&self, path: &Path) -> MatchResult {
        let label = path.display().to_string();

        match self.try_scan_file(path, &label) {
            Ok(matches) => {
                if !matches.is_empty() {
                    tracing::info!(lockfile = %label, matches = matches.len(), "compromised packages found");
                }
                MatchResult::new(label, matches)
            }
            Err(e) => {
                tracing::warn!(lockfile = %label, error = %e, "lockfile could not be scanned");
                MatchResult::failed(label, e.to_string())
            }
        }
    }

    /// Scans files one after another, preserving input order.
    pub fn scan_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<MatchResult> {
        paths.iter().map(|p| self.scan_file(p.as_ref())).collect()
    }

    fn try_scan_file(&self, path: &Path, label: &str) -> Result<Vec<CandidatePair>, ScanError> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        self.scan_content(label, LockfileFormat::classify(path), &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AffectedRecord;

    fn scanner() -> LockfileScanner {
        LockfileScanner::new(Arc::new(VulnerabilityIndex::build(vec![
            AffectedRecord::new("left-pad", "1.3.0"),
            AffectedRecord::new("@scope/pkg", "1.0.0"),
            AffectedRecord::new("debug", "4.4.2"),
            AffectedRecord::new("my-app", "1.0.0"),
        ])))
    }

    #[test]
    fn classify_by_extension() {
        assert_eq!(
            LockfileFormat::classify(Path::new("package-lock.json")),
            LockfileFormat::JsonTree
        );
        assert_eq!(
            LockfileFormat::classify(Path::new("/a/npm-shrinkwrap.json")),
            LockfileFormat::JsonTree
        );
        assert_eq!(
            LockfileFormat::classify(Path::new("pnpm-lock.yaml")),
            LockfileFormat::LineOriented
        );
        assert_eq!(
            LockfileFormat::classify(Path::new("deps.yml")),
            LockfileFormat::LineOriented
        );
        assert_eq!(
            LockfileFormat::classify(Path::new("yarn.lock")),
            LockfileFormat::LineOriented
        );
        assert_eq!(
            LockfileFormat::classify(Path::new("LOCKFILE")),
            LockfileFormat::LineOriented
        );
    }

    #[test]
    fn format_display_names() {
        assert_eq!(LockfileFormat::JsonTree.to_string(), "json-tree");
        assert_eq!(LockfileFormat::LineOriented.to_string(), "line-oriented");
    }

    #[test]
    fn get_extractor_matches_format() {
        for format in [LockfileFormat::JsonTree, LockfileFormat::LineOriented] {
            assert_eq!(get_extractor(format).format(), format);
        }
    }

    #[test]
    fn every_affected_record_in_flat_manifest_is_reported_once() {
        let lockfile = r#"{
  "packages": {
    "node_modules/left-pad": { "version": "1.3.0" },
    "node_modules/@scope/pkg": { "version": "1.0.0" },
    "node_modules/debug": { "version": "4.4.2" }
  }
}"#;
        let matches = scanner()
            .scan_content("package-lock.json", LockfileFormat::JsonTree, lockfile)
            .unwrap();

        assert_eq!(
            matches,
            vec![
                CandidatePair::new("left-pad", "1.3.0"),
                CandidatePair::new("@scope/pkg", "1.0.0"),
                CandidatePair::new("debug", "4.4.2"),
            ]
        );
    }

    #[test]
    fn flat_and_nested_duplicates_report_once() {
        let lockfile = r#"{
  "packages": { "node_modules/left-pad": { "version": "1.3.0" } },
  "dependencies": {
    "a": { "version": "1.0.0", "dependencies": { "left-pad": { "version": "1.3.0" } } },
    "left-pad": { "version": "1.3.0" }
  }
}"#;
        let matches = scanner()
            .scan_content("package-lock.json", LockfileFormat::JsonTree, lockfile)
            .unwrap();

        assert_eq!(matches, vec![CandidatePair::new("left-pad", "1.3.0")]);
    }

    #[test]
    fn root_entry_is_never_reported() {
        let lockfile = r#"{
  "name": "my-app",
  "packages": {
    "": { "name": "my-app", "version": "1.0.0" }
  }
}"#;
        let matches = scanner()
            .scan_content("package-lock.json", LockfileFormat::JsonTree, lockfile)
            .unwrap();

        assert!(matches.is_empty());
    }

    #[test]
    fn safe_versions_are_not_reported() {
        let lockfile = r#"{
  "packages": {
    "node_modules/left-pad": { "version": "1.3.1" },
    "node_modules/lodash": { "version": "1.3.0" }
  }
}"#;
        let matches = scanner()
            .scan_content("package-lock.json", LockfileFormat::JsonTree, lockfile)
            .unwrap();

        assert!(matches.is_empty());
    }

    #[test]
    fn two_line_import_form_matches_once() {
        let lockfile = "importers:\n  .:\n    dependencies:\n      'left-pad':\n        specifier: ^1.3.0\n        version: 1.3.0\n\npackages:\n\n  left-pad@1.3.0:\n    resolution: {integrity: sha512-x}\n";
        let matches = scanner()
            .scan_content("pnpm-lock.yaml", LockfileFormat::LineOriented, lockfile)
            .unwrap();

        assert_eq!(matches, vec![CandidatePair::new("left-pad", "1.3.0")]);
    }

    #[test]
    fn link_target_without_version_matches_nothing() {
        let lockfile = "  'left-pad':\n    specifier: link:../left-pad\n    path: ../left-pad\n";
        let matches = scanner()
            .scan_content("pnpm-lock.yaml", LockfileFormat::LineOriented, lockfile)
            .unwrap();

        assert!(matches.is_empty());
    }

    #[test]
    fn scanning_twice_is_identical() {
        let lockfile = "packages:\n  '@scope/pkg@1.0.0':\n    resolution: {}\n  debug@4.4.2:\n    resolution: {}\n";
        let scanner = scanner();

        let first = scanner
            .scan_content("pnpm-lock.yaml", LockfileFormat::LineOriented, lockfile)
            .unwrap();
        let second = scanner
            .scan_content("pnpm-lock.yaml", LockfileFormat::LineOriented, lockfile)
            .unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn scan_file_absorbs_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("package-lock.json");
        let good = dir.path().join("yarn.lock");
        fs::write(&bad, "{ broken").unwrap();
        fs::write(&good, "left-pad@1.3.0:\n  version \"1.3.0\"\n").unwrap();

        let results = scanner().scan_files(&[bad.clone(), good.clone()]);

        assert_eq!(results.len(), 2);
        assert!(results[0].is_failed());
        assert!(results[0].matches.is_empty());
        assert_eq!(results[0].lockfile_label, bad.display().to_string());
        assert!(!results[1].is_failed());
        assert_eq!(results[1].matches, vec![CandidatePair::new("left-pad", "1.3.0")]);
    }

    #[test]
    fn scan_file_absorbs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = scanner().scan_file(&dir.path().join("pnpm-lock.yaml"));

        assert!(result.is_failed());
        assert!(result.matches.is_empty());
    }
}
