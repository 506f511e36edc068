//! Vulnerability lookup and matching.
//!
//! [`VulnerabilityIndex`] holds the compromised-package dataset and
//! [`find_matches`] filters a lockfile's candidates against any
//! [`VulnerabilityChecker`].

mod dataset;
mod index;

pub use dataset::parse_dataset;
pub use index::VulnerabilityIndex;

use crate::model::CandidatePair;
use std::collections::HashSet;

/// Trait for answering whether an exact package version is affected.
pub trait VulnerabilityChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Exact, case-sensitive lookup of `name` and `version`.
    fn is_affected(&self, name: &str, version: &str) -> bool;
}

/// Filters lockfile candidates down to affected packages.
///
/// Each distinct `name@version` is checked at most once and reported at most
/// once, in order of first occurrence.
///
/// # Example
///
/// ```
/// use lockscan::checker::{find_matches, VulnerabilityIndex};
/// use lockscan::{AffectedRecord, CandidatePair};
///
/// let index = VulnerabilityIndex::build(vec![AffectedRecord::new("left-pad", "1.3.0")]);
/// let candidates = vec![
///     CandidatePair::new("left-pad", "1.3.0"),
///     CandidatePair::new("left-pad", "1.3.0"),
///     CandidatePair::new("left-pad", "1.2.0"),
/// ];
///
/// let matches = find_matches(candidates, &index);
/// assert_eq!(matches, vec![CandidatePair::new("left-pad", "1.3.0")]);
/// ```
pub fn find_matches<I, C>(candidates: I, checker: &C) -> Vec<CandidatePair>
where
    I: IntoIterator<Item = CandidatePair>,
    C: VulnerabilityChecker + ?Sized,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut matches = Vec::new();

    for candidate in candidates {
        if !seen.insert((candidate.name.clone(), candidate.version.clone())) {
            continue;
        }

        if checker.is_affected(&candidate.name, &candidate.version) {
            matches.push(candidate);
        }
    }

    matches
}
