//! SARIF (Static Analysis Results Interchange Format) output for GitHub Actions integration.
//!
//! When used with `--format sarif`, the output can be uploaded to GitHub Code Scanning
//! to annotate the offending lockfiles on pull requests.

use crate::model::ScanReport;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF v2.1.0 schema root
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifRuleConfiguration,
}

#[derive(Serialize)]
struct SarifRuleConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

// Every match is a known-compromised release.
const LEVEL: &str = "error";

/// Generate and print SARIF output
pub fn print_sarif(report: &ScanReport) -> Result<()> {
    println!("{}", generate_sarif_string(report)?);
    Ok(())
}

/// Generate SARIF as a string (for file output)
pub fn generate_sarif_string(report: &ScanReport) -> Result<String> {
    let mut rules = Vec::new();
    let mut rule_ids = HashSet::new();
    let mut results = Vec::new();

    for file in &report.results {
        for pkg in &file.matches {
            let rule_id = pkg.key();

            // One rule per compromised release, however many lockfiles reference it
            if rule_ids.insert(rule_id.clone()) {
                rules.push(SarifRule {
                    id: rule_id.clone(),
                    name: pkg.name.clone(),
                    short_description: SarifMessage {
                        text: format!("Compromised package version {}", rule_id),
                    },
                    default_configuration: SarifRuleConfiguration { level: LEVEL },
                });
            }

            results.push(SarifResult {
                rule_id: rule_id.clone(),
                level: LEVEL,
                message: SarifMessage {
                    text: format!(
                        "{} resolves {} version {}, which is known to be compromised",
                        file.lockfile_label, pkg.name, pkg.version
                    ),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: file.lockfile_label.clone(),
                        },
                    },
                }],
            });
        }
    }

    let sarif = SarifReport {
        schema: SARIF_SCHEMA,
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "lockscan",
                    version: env!("CARGO_PKG_VERSION"),
                    rules,
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&sarif)?)
}
