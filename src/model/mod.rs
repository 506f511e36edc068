//! Core data types for affected packages, lockfile candidates, and scan results.
//!
//! This module contains the fundamental types used throughout lockscan:
//!
//! - [`AffectedRecord`] - A package version known to be compromised
//! - [`CandidatePair`] - A `(name, version)` pair observed in a lockfile
//! - [`MatchResult`] - The matches found in one lockfile
//! - [`ScanReport`] - Complete results of a run
//!
//! # Example
//!
//! ```
//! use lockscan::{CandidatePair, MatchResult, ScanReport};
//!
//! let result = MatchResult::new(
//!     "package-lock.json",
//!     vec![CandidatePair::new("left-pad", "1.3.0")],
//! );
//! let report = ScanReport::new(vec![result], 0);
//!
//! assert_eq!(report.total_matches(), 1);
//! ```

mod package;
mod report;

pub use package::*;
pub use report::*;
