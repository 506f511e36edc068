use crate::model::ScanReport;
use anyhow::Result;

pub fn print_json(report: &ScanReport) -> Result<()> {
    println!("{}", generate_json_string(report)?);
    Ok(())
}

pub(super) fn generate_json_string(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
