//! Extraction for YAML-like lockfiles (`pnpm-lock.yaml`, `yarn.lock`).
//!
//! No YAML parser is involved. Two scans run over the raw text and their
//! candidates are pooled:
//!
//! 1. Inline keys anywhere in the text: `name@version:` or
//!    `'@scope/name@version':`, as used by `packages:` and `snapshots:`
//!    sections and classic single-line lock entries.
//! 2. Two-line importer entries, driven by [`ImportScanner`]:
//!
//! ```yaml
//!   'left-pad':
//!     specifier: ^1.3.0
//!     version: 1.3.0
//! ```

use regex::Regex;
use std::sync::LazyLock;

use super::{LockfileExtractor, LockfileFormat};
use crate::error::ScanError;
use crate::model::CandidatePair;

// A key starts a line or follows whitespace, a quote or a comma, so peer-hash
// tails like `_bar@2.0.0` never start one. Only scoped names contain `/`. An
// optional pnpm peer suffix `(peer@x)` may sit between the version and the colon.
static INLINE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:^|[\s'",])['"]?/?(@[\w.\-]+/[\w.\-]+|[\w.\-]+)@([^\s'"()@/:,]+)(?:\(.*\))?['"]?:(?:\s|$)"#,
    )
    .expect("valid inline key regex")
});

static IMPORT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+['"]?([\w\-./@]+)['"]?:\s*$"#).expect("valid import key regex")
});

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+version:\s*['"]?([^\s'"(]+)"#).expect("valid version regex")
});

static SPECIFIER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+specifier:").expect("valid specifier regex"));

pub struct TextExtractor;

impl LockfileExtractor for TextExtractor {
    fn name(&self) -> &'static str {
        "Text lockfile"
    }

    fn format(&self) -> LockfileFormat {
        LockfileFormat::LineOriented
    }

    fn extract(&self, content: &str, _label: &str) -> Result<Vec<CandidatePair>, ScanError> {
        let mut candidates = scan_inline_keys(content);
        candidates.extend(scan_import_entries(content));
        Ok(candidates)
    }
}

fn scan_inline_keys(content: &str) -> Vec<CandidatePair> {
    INLINE_KEY
        .captures_iter(content)
        .map(|caps| CandidatePair::new(&caps[1], &caps[2]))
        .collect()
}

fn scan_import_entries(content: &str) -> Vec<CandidatePair> {
    let mut scanner = ImportScanner::new();
    content
        .lines()
        .filter_map(|line| scanner.feed(line))
        .collect()
}

/// State of the two-line importer scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    /// Looking for a bare `name:` key line.
    Idle,
    /// A key was seen; waiting for its `version:` line.
    AwaitingVersion { name: String },
}

/// Line-by-line recognizer for importer entries.
///
/// In [`ImportState::AwaitingVersion`] a `version:` line emits a candidate, a
/// `specifier:` line keeps the pending name, and any other line drops it. That
/// line is then read again as an idle line, so it may start a new entry.
#[derive(Debug)]
pub struct ImportScanner {
    state: ImportState,
}

impl ImportScanner {
    pub fn new() -> Self {
        Self {
            state: ImportState::Idle,
        }
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Advances the machine by one line, returning a candidate when an entry completes.
    pub fn feed(&mut self, line: &str) -> Option<CandidatePair> {
        if let ImportState::AwaitingVersion { name } =
            std::mem::replace(&mut self.state, ImportState::Idle)
        {
            if let Some(caps) = VERSION_LINE.captures(line) {
                return Some(CandidatePair::new(name, &caps[1]));
            }
            if SPECIFIER_LINE.is_match(line) {
                self.state = ImportState::AwaitingVersion { name };
                return None;
            }
        }

        if let Some(caps) = IMPORT_KEY.captures(line) {
            self.state = ImportState::AwaitingVersion {
                name: caps[1].to_owned(),
            };
        }

        None
    }
}

impl Default for ImportScanner {
    fn default() -> Self {
        Self::new()
    }
}
