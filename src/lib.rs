pub mod checker;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod scanner;

pub use checker::{find_matches, VulnerabilityChecker, VulnerabilityIndex};
pub use config::Config;
pub use error::ScanError;
pub use model::{AffectedRecord, CandidatePair, MatchResult, ScanReport};
pub use scanner::{LockfileFormat, LockfileScanner};
