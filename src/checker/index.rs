use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::{parse_dataset, VulnerabilityChecker};
use crate::error::ScanError;
use crate::model::AffectedRecord;

/// In-memory index of compromised package versions.
///
/// Built once from the dataset and read-only afterwards, so it can be shared
/// across threads behind an `Arc`. Lookups compare names and versions byte for
/// byte; no trimming or case folding is applied.
#[derive(Debug, Default, Clone)]
pub struct VulnerabilityIndex {
    by_name: HashMap<String, HashSet<String>>,
    records: usize,
}

impl VulnerabilityIndex {
    /// Builds an index, merging versions of records that share a name.
    pub fn build(records: impl IntoIterator<Item = AffectedRecord>) -> Self {
        let mut by_name: HashMap<String, HashSet<String>> = HashMap::new();
        let mut count = 0;

        for record in records {
            by_name.entry(record.name).or_default().insert(record.version);
            count += 1;
        }

        Self {
            by_name,
            records: count,
        }
    }

    /// Loads and indexes a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::DatasetLoad`] if the file cannot be read and
    /// [`ScanError::DatasetEmpty`] if it holds no records.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::DatasetLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let records = parse_dataset(&content, &path.display().to_string())?;
        let index = Self::build(records);

        tracing::info!(
            path = %path.display(),
            records = index.records,
            packages = index.package_count(),
            "loaded compromised package dataset"
        );

        Ok(index)
    }

    pub fn has(&self, name: &str, version: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|versions| versions.contains(version))
    }

    /// Number of records the index was built from, duplicates included.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of distinct package names.
    pub fn package_count(&self) -> usize {
        self.by_name.len()
    }
}

impl VulnerabilityChecker for VulnerabilityIndex {
    fn name(&self) -> &'static str {
        "Compromised package dataset"
    }

    fn is_affected(&self, name: &str, version: &str) -> bool {
        self.has(name, version)
    }
}
