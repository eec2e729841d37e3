use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use depsweep::{
    checker::VulnerabilityIndex,
    config::Config,
    model::{Finding, ScanResult},
    output::{format_result_to_string, print_result, OutputFormat},
    scanner::{find_manifest_files, scan_files},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const VULNERABLE: u8 = 1;
    pub const ERROR: u8 = 1;
}

#[derive(Debug, Parser)]
#[command(name = "depsweep")]
#[command(
    author,
    version,
    about = "Scan dependency manifests and lockfiles for known-compromised packages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a directory tree against a vulnerability list
    Scan {
        /// CSV file of known-vulnerable package,version pairs
        csv: PathBuf,

        /// Root directory to scan
        path: PathBuf,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
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

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(default_env_filter())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

/// Honors RUST_LOG when set; otherwise enables warnings so recoverable
/// traversal errors still reach stderr without opt-in.
fn default_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn run() -> Result<u8> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(exit_code_for_parse_error(&err));
        }
    };
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            csv,
            path,
            format,
            output,
            quiet,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            run_scan(&config, csv, path, format_str, output, quiet)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Help and version requests exit clean; any real usage error (missing
/// arguments included) exits with the same status as a failed scan.
fn exit_code_for_parse_error(err: &clap::Error) -> u8 {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
        _ => exit_codes::ERROR,
    }
}

fn run_scan(
    config: &Config,
    csv: PathBuf,
    root: PathBuf,
    format: String,
    output_file: Option<String>,
    quiet: bool,
) -> Result<u8> {
    let format = OutputFormat::from_str(&format)?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none() && !quiet;

    if !csv.exists() {
        bail!("Vulnerability list not found: {}", csv.display());
    }
    if !root.exists() {
        bail!("Scan path not found: {}", root.display());
    }

    let index = VulnerabilityIndex::load(&csv)?;
    if is_interactive {
        println!(
            "Loaded {} vulnerable packages from {}",
            index.len(),
            csv.display()
        );
    }

    // Discover manifest files
    let discover_progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Searching {} for manifest files...", root.display()));
        Some(pb)
    } else {
        None
    };

    let files = find_manifest_files(&root);

    if let Some(pb) = discover_progress {
        pb.finish_with_message(format!("Found {} manifest files", files.len()));
    }

    // Scan each file against the index
    let scan_progress = if is_interactive && !files.is_empty() {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Scanning manifests...")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut findings = Vec::new();
    for file in &files {
        findings.extend(scan_files(std::slice::from_ref(file), &index));
        if let Some(ref pb) = scan_progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = scan_progress {
        pb.finish_with_message(format!("Collected {} raw findings", findings.len()));
    }

    let findings = apply_ignore_list(config, findings);
    let result = ScanResult::new(files.len(), findings);

    // Handle output
    if let Some(path) = output_file {
        let rendered = format_result_to_string(&result, format)?;
        std::fs::write(&path, rendered)?;
        if !quiet {
            println!("Results written to: {}", path);
        }
    } else {
        print_result(&result, format)?;
    }

    if result.has_exact_match() {
        Ok(exit_codes::VULNERABLE)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn apply_ignore_list(config: &Config, findings: Vec<Finding>) -> Vec<Finding> {
    if config.ignore.packages.is_empty() {
        return findings;
    }

    findings
        .into_iter()
        .filter(|f| !config.ignore.should_ignore_package(&f.package))
        .collect()
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

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'depsweep config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_exit_with_error_status() {
        let err = Cli::try_parse_from(["depsweep", "scan"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), exit_codes::ERROR);

        let err = Cli::try_parse_from(["depsweep", "scan", "list.csv"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), exit_codes::ERROR);

        let err = Cli::try_parse_from(["depsweep"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), exit_codes::ERROR);
    }

    #[test]
    fn test_help_and_version_exit_clean() {
        let err = Cli::try_parse_from(["depsweep", "--help"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), exit_codes::SUCCESS);

        let err = Cli::try_parse_from(["depsweep", "--version"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), exit_codes::SUCCESS);
    }

    #[test]
    fn test_default_log_filter_enables_warnings() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(default_env_filter().to_string(), "warn");
    }
}
