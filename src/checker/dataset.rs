//! Compromised-package dataset format.
//!
//! The first line is a header and is ignored. Every other non-blank line
//! holds one record:
//!
//! ```text
//! "package";"version"
//! "@ctrl/tinycolor";"4.1.1"
//! "left-pad";"1.3.0"
//! ```
//!
//! Embedded quotes are not supported.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ScanError;
use crate::model::AffectedRecord;

static RECORD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]*)";"([^"]*)"$"#).expect("valid dataset regex"));

/// Parses dataset text into records.
///
/// Malformed lines are skipped. `source` names the dataset in errors.
///
/// # Errors
///
/// Returns [`ScanError::DatasetEmpty`] if no line yields a record.
pub fn parse_dataset(content: &str, source: &str) -> Result<Vec<AffectedRecord>, ScanError> {
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match RECORD_LINE.captures(line) {
            Some(caps) => records.push(AffectedRecord::new(&caps[1], &caps[2])),
            None => {
                tracing::debug!(source, line = line_no + 1, "skipping malformed dataset line");
            }
        }
    }

    if records.is_empty() {
        return Err(ScanError::DatasetEmpty {
            path: source.to_owned(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_discarded() {
        let content = "\"left-pad\";\"1.0.0\"\n\"left-pad\";\"1.3.0\"\n";
        let records = parse_dataset(content, "test").unwrap();

        assert_eq!(records, vec![AffectedRecord::new("left-pad", "1.3.0")]);
    }

    #[test]
    fn blank_and_malformed_lines_are_skipped() {
        let content = "package;version\n\n\"a\";\"1.0.0\"\nnot a record\n  \n\"b\";\"2.0.0\"\n";
        let records = parse_dataset(content, "test").unwrap();

        assert_eq!(
            records,
            vec![
                AffectedRecord::new("a", "1.0.0"),
                AffectedRecord::new("b", "2.0.0"),
            ]
        );
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let content = "\"name\";\"version\"\r\n\"@scope/pkg\";\"1.0.0\"\r\n";
        let records = parse_dataset(content, "test").unwrap();

        assert_eq!(records, vec![AffectedRecord::new("@scope/pkg", "1.0.0")]);
    }

    #[test]
    fn fields_are_kept_verbatim() {
        let content = "header\n\"My-Pkg\";\" 1.0.0\"\n";
        let records = parse_dataset(content, "test").unwrap();

        assert_eq!(records[0].name, "My-Pkg");
        assert_eq!(records[0].version, " 1.0.0");
    }

    #[test]
    fn no_records_is_an_error() {
        let err = parse_dataset("\"name\";\"version\"\n\n", "data.csv").unwrap_err();
        assert!(matches!(err, ScanError::DatasetEmpty { ref path } if path == "data.csv"));

        assert!(parse_dataset("", "data.csv").is_err());
    }
}
