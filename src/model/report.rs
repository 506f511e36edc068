use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CandidatePair;

/// Matches found in a single lockfile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "lockfile")]
    pub lockfile_label: String,
    pub matches: Vec<CandidatePair>,
    /// Set when the lockfile could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    pub fn new(lockfile_label: impl Into<String>, matches: Vec<CandidatePair>) -> Self {
        Self {
            lockfile_label: lockfile_label.into(),
            matches,
            error: None,
        }
    }

    pub fn failed(lockfile_label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            lockfile_label: lockfile_label.into(),
            matches: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub dataset_records: usize,
    pub results: Vec<MatchResult>,
}

impl ScanReport {
    pub fn new(results: Vec<MatchResult>, dataset_records: usize) -> Self {
        Self {
            scan_time: Utc::now(),
            dataset_records,
            results,
        }
    }

    pub fn files_scanned(&self) -> usize {
        self.results.len()
    }

    pub fn files_with_matches(&self) -> usize {
        self.results.iter().filter(|r| !r.matches.is_empty()).count()
    }

    pub fn files_failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn total_matches(&self) -> usize {
        self.results.iter().map(|r| r.matches.len()).sum()
    }

    pub fn has_matches(&self) -> bool {
        self.results.iter().any(|r| !r.matches.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_files_and_matches() {
        let report = ScanReport::new(
            vec![
                MatchResult::new(
                    "a/package-lock.json",
                    vec![
                        CandidatePair::new("left-pad", "1.3.0"),
                        CandidatePair::new("@ctrl/tinycolor", "4.1.1"),
                    ],
                ),
                MatchResult::new("b/pnpm-lock.yaml", Vec::new()),
                MatchResult::failed("c/package-lock.json", "invalid JSON"),
            ],
            10,
        );

        assert_eq!(report.files_scanned(), 3);
        assert_eq!(report.files_with_matches(), 1);
        assert_eq!(report.files_failed(), 1);
        assert_eq!(report.total_matches(), 2);
        assert!(report.has_matches());
    }

    #[test]
    fn failed_result_serializes_error() {
        let result = MatchResult::failed("package-lock.json", "bad json");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["lockfile"], "package-lock.json");
        assert_eq!(json["error"], "bad json");

        let ok = serde_json::to_value(MatchResult::new("yarn.lock", Vec::new())).unwrap();
        assert!(ok.get("error").is_none());
    }
}
