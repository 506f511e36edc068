use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use lockscan::{
    config::Config,
    output::{format_report_to_string, print_report, OutputFormat},
    scanner::{discover_lockfiles, LockfileScanner},
    MatchResult, ScanReport, VulnerabilityIndex,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const MATCHES_FOUND: u8 = 2;
}

#[derive(Parser)]
#[command(name = "lockscan")]
#[command(
    author,
    version,
    about = "Scan dependency lockfiles for known-compromised package versions"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan lockfiles for compromised package versions
    Scan {
        /// Lockfiles or directories to scan (defaults to the current directory)
        paths: Vec<PathBuf>,

        /// Compromised package dataset ("name";"version" lines after a header)
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Output format (table, json, sarif)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Scan lockfiles sequentially
        #[arg(long)]
        no_parallel: bool,

        /// Exit with success even when compromised packages are found
        #[arg(long)]
        no_fail: bool,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

struct ScanOptions {
    paths: Vec<PathBuf>,
    dataset: PathBuf,
    format: OutputFormat,
    output_file: Option<String>,
    parallel: bool,
    fail_on_match: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lockscan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    });

    match cli.command {
        Commands::Scan {
            paths,
            dataset,
            format,
            output,
            no_parallel,
            no_fail,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
            let dataset = dataset.or_else(|| config.dataset.clone()).context(
                "no dataset given; pass --dataset or set `dataset` in the config file",
            )?;

            let options = ScanOptions {
                paths,
                dataset,
                format,
                output_file: output,
                parallel: !no_parallel && config.parallel,
                fail_on_match: !no_fail && config.fail_on_match,
            };

            run_scan(options, &config).await
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(options: ScanOptions, config: &Config) -> Result<u8> {
    let is_interactive = options.format == OutputFormat::Table && options.output_file.is_none();

    // A dataset problem leaves nothing to match against
    let index = VulnerabilityIndex::load(&options.dataset)?;
    let dataset_records = index.record_count();
    let scanner = LockfileScanner::new(Arc::new(index));

    let roots = if options.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        options.paths
    };

    let mut seen = HashSet::new();
    let lockfiles: Vec<PathBuf> = roots
        .iter()
        .flat_map(|root| discover_lockfiles(root, &config.lockfile_names, &config.exclude_dirs))
        .filter(|path| seen.insert(path.clone()))
        .collect();

    tracing::debug!(lockfiles = lockfiles.len(), "discovered lockfiles");

    let mut results = if options.parallel && lockfiles.len() > 1 {
        scan_concurrent(&scanner, &lockfiles, is_interactive).await
    } else {
        scan_sequential(&scanner, &lockfiles, is_interactive)
    };

    for result in &mut results {
        let ignored = config.ignore.filter_matches(&mut result.matches);
        if ignored > 0 {
            tracing::debug!(lockfile = %result.lockfile_label, ignored, "suppressed ignored packages");
        }
    }

    let report = ScanReport::new(results, dataset_records);

    // Handle output
    if let Some(path) = &options.output_file {
        let content = format_report_to_string(&report, options.format)?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path))?;
        println!("Results written to: {}", path);
    } else {
        print_report(&report, options.format)?;
    }

    if options.fail_on_match && report.has_matches() {
        Ok(exit_codes::MATCHES_FOUND)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn progress_bar(len: usize, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template(template)
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Scan lockfiles concurrently on the blocking thread pool
async fn scan_concurrent(
    scanner: &LockfileScanner,
    lockfiles: &[PathBuf],
    is_interactive: bool,
) -> Vec<MatchResult> {
    let progress = is_interactive.then(|| {
        Arc::new(progress_bar(
            lockfiles.len(),
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Scanning lockfiles...",
        ))
    });

    let tasks: Vec<_> = lockfiles
        .iter()
        .map(|path| {
            let scanner = scanner.clone();
            let path = path.clone();
            let pb = progress.clone();
            async move {
                let label = path.display().to_string();
                let result = tokio::task::spawn_blocking(move || scanner.scan_file(&path))
                    .await
                    .unwrap_or_else(|e| MatchResult::failed(label, format!("scan task failed: {e}")));
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                result
            }
        })
        .collect();

    // join_all keeps input order
    let results = join_all(tasks).await;

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Scanned {} lockfiles", results.len()));
    }

    results
}

fn scan_sequential(
    scanner: &LockfileScanner,
    lockfiles: &[PathBuf],
    is_interactive: bool,
) -> Vec<MatchResult> {
    let progress = is_interactive
        .then(|| progress_bar(lockfiles.len(), "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}"));

    let mut results = Vec::with_capacity(lockfiles.len());

    for path in lockfiles {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Scanning {}...", path.display()));
        }

        results.push(scanner.scan_file(path));

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Scanned {} lockfiles", results.len()));
    }

    results
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'lockscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
