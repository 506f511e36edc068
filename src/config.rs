//! Configuration file handling.
//!
//! This module provides loading and saving of lockscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/lockscan/config.toml`
//! - macOS: `~/Library/Application Support/lockscan/config.toml`
//! - Windows: `%APPDATA%\lockscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! dataset = "/opt/lockscan/compromised.csv"
//! default_format = "table"
//! parallel = true
//! fail_on_match = true
//! lockfile_names = ["package-lock.json", "pnpm-lock.yaml"]
//! exclude_dirs = ["node_modules", ".git", "vendor"]
//!
//! [ignore]
//! packages = ["@internal/*"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::CandidatePair;
use crate::scanner::{DEFAULT_EXCLUDE_DIRS, DEFAULT_LOCKFILE_NAMES};

/// Application configuration.
///
/// Every field has a default, so a partial file is valid. Command-line
/// flags take precedence over these values.
///
/// # Example
///
/// ```no_run
/// use lockscan::Config;
///
/// let config = Config::load().unwrap();
///
/// println!("Format: {}", config.default_format);
/// println!("Parallel: {}", config.parallel);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset used when `--dataset` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json", "sarif"
    /// Default: "table"
    pub default_format: String,

    /// Scan lockfiles concurrently.
    ///
    /// Default: true
    pub parallel: bool,

    /// Exit with a non-zero code when compromised packages are found.
    ///
    /// Default: true
    pub fail_on_match: bool,

    /// File names treated as lockfiles when walking directories.
    pub lockfile_names: Vec<String>,

    /// Directory names skipped when walking directories.
    pub exclude_dirs: Vec<String>,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Packages whose matches are suppressed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names to suppress. Supports `*` wildcards (e.g. "@internal/*").
    pub packages: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a package should be ignored.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }

    /// Removes ignored packages from a match list, returning how many were dropped.
    pub fn filter_matches(&self, matches: &mut Vec<CandidatePair>) -> usize {
        let before = matches.len();
        matches.retain(|m| !self.should_ignore_package(&m.name));
        before - matches.len()
    }
}

/// Glob matching with `*` as the only wildcard.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];

    if text.len() < first.len() + last.len() || !text.starts_with(first) || !text.ends_with(last)
    {
        return false;
    }

    let mut remaining = &text[first.len()..text.len() - last.len()];

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            default_format: "table".to_string(),
            parallel: true,
            fail_on_match: true,
            lockfile_names: DEFAULT_LOCKFILE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use lockscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("lockscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lockscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
