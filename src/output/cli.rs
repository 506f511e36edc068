use crate::model::ScanReport;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Lockfile")]
    lockfile: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Lockfile")]
    lockfile: String,
    #[tabled(rename = "Error")]
    error: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.has_matches() {
        println!(
            "\x1b[31mFound {} compromised package versions:\x1b[0m",
            report.total_matches()
        );
        println!();

        let rows: Vec<MatchRow> = report
            .results
            .iter()
            .flat_map(|file| {
                file.matches.iter().map(move |m| MatchRow {
                    lockfile: truncate_left(&file.lockfile_label, 50),
                    package: truncate(&m.name, 40),
                    version: m.version.clone(),
                })
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    } else if report.files_scanned() == 0 {
        println!("No lockfiles found.");
    } else {
        println!("\x1b[32mNo compromised packages found.\x1b[0m");
    }

    print_failures(report);

    println!();
    print_summary(report);

    Ok(())
}

fn print_failures(report: &ScanReport) {
    let rows: Vec<FailureRow> = report
        .results
        .iter()
        .filter_map(|file| {
            let error = file.error.as_ref()?;
            Some(FailureRow {
                lockfile: truncate_left(&file.lockfile_label, 50),
                error: truncate(error, 60),
            })
        })
        .collect();

    if rows.is_empty() {
        return;
    }

    println!();
    println!("\x1b[33m{} lockfiles could not be scanned:\x1b[0m", rows.len());
    println!();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn print_summary(report: &ScanReport) {
    println!("Summary:");
    println!("  Dataset records: {}", report.dataset_records);
    println!("  Lockfiles scanned: {}", report.files_scanned());
    println!("  Lockfiles with matches: {}", report.files_with_matches());
    if report.files_failed() > 0 {
        println!("  Lockfiles failed: {}", report.files_failed());
    }
    println!("  Total matches: {}", report.total_matches());
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncates from the front, keeping the file name end of a path visible.
fn truncate_left(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().skip(count - max_len.saturating_sub(3)).collect();
        format!("...{}", kept)
    }
}
