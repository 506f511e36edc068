//! Error types for dataset loading and lockfile scanning.
//!
//! Only dataset failures are fatal to a run. Lockfile failures are scoped to
//! a single file and are absorbed by the caller.

use std::path::Path;

/// Errors produced by the lockscan library.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The vulnerability dataset could not be read.
    #[error("dataset load error: {path}: {reason}")]
    DatasetLoad {
        /// Dataset file path
        path: String,
        /// Failure reason
        reason: String,
    },

    /// The dataset was readable but contained no usable records.
    #[error("dataset contains no records: {path}")]
    DatasetEmpty {
        /// Dataset file path
        path: String,
    },

    /// A lockfile could not be parsed.
    #[error("lockfile parse error: {path}: {reason}")]
    LockfileParse {
        /// Lockfile label
        path: String,
        /// Failure reason
        reason: String,
    },

    /// File I/O error.
    #[error("io error: {path}: {source}")]
    Io {
        /// Related file path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
