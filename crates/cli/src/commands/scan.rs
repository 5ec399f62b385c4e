//! The `scan` command: run the pipeline and render the report.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use codeshield_scanners::{DriverKind, Pipeline, PipelineConfig, Report};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Source tree to analyze.
    #[arg(short, long)]
    pub input: PathBuf,

    /// External rule file (JSON). Falls back to built-in rules when unusable.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DriverChoice::Basic)]
    pub driver: DriverChoice,

    /// Kill deadline for the external driver, in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Old-version file (relative to the input tree) for the storage layout diff.
    #[arg(long, requires = "storage_diff_new")]
    pub storage_diff_old: Option<String>,

    /// New-version file (relative to the input tree) for the storage layout diff.
    #[arg(long, requires = "storage_diff_old")]
    pub storage_diff_new: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the IR scanners one at a time instead of on the thread pool.
    #[arg(long)]
    pub no_parallel: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum DriverChoice {
    /// Built-in regex rule scanner.
    Basic,
    /// External Slither invocation with builtin fallback.
    Slither,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
}

pub fn execute(args: ScanArgs) -> Result<()> {
    init_tracing(args.verbose);

    let config = PipelineConfig {
        rules_path: args.rules.clone(),
        driver: match args.driver {
            DriverChoice::Basic => DriverKind::Basic,
            DriverChoice::Slither => DriverKind::Slither,
        },
        external_timeout: Duration::from_secs(args.timeout),
        storage_diff_old: args.storage_diff_old.clone(),
        storage_diff_new: args.storage_diff_new.clone(),
        parallel: !args.no_parallel,
    };

    let start = Instant::now();
    let report = Pipeline::new(config)
        .run(&args.input)
        .with_context(|| format!("scan of {} failed", args.input.display()))?;
    let elapsed = start.elapsed();

    match args.format {
        OutputFormat::Console => {
            render_console(&report, &args, elapsed.as_secs_f64());
            if let Some(path) = &args.output {
                fs::write(path, report.findings_json()?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("\nFindings written to {}", path.display());
            }
        }
        OutputFormat::Json => emit(report.findings_json()?, args.output.as_deref())?,
        OutputFormat::Sarif => emit(report.sarif_json()?, args.output.as_deref())?,
    }

    Ok(())
}

fn emit(document: String, output: Option<&std::path::Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, document)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", document),
    }
    Ok(())
}

fn render_console(report: &Report, args: &ScanArgs, elapsed_secs: f64) {
    println!(
        "{}",
        format!("CodeShield scan: {}", args.input.display())
            .bright_blue()
            .bold()
    );
    println!("{}", "=".repeat(50).bright_blue());

    if report.findings.is_empty() {
        println!("{}", "No findings.".bright_green());
    } else {
        println!("Found {} findings:\n", report.findings.len());
        for (i, ranked) in report.findings.iter().enumerate() {
            let finding = &ranked.finding;
            println!(
                "{}. [{:.3}] {} {} at {}",
                i + 1,
                ranked.rank_score,
                colorize_severity(&finding.severity),
                finding.rule_id.bold(),
                finding.location
            );
            if args.verbose {
                if let Some(func) = &finding.func {
                    println!("   Function: {}", func);
                }
                if !finding.snippet.is_empty() {
                    println!("   {}", finding.snippet.dimmed());
                }
                if !finding.remediation.is_empty() {
                    println!("   Fix: {}", finding.remediation);
                }
            }
        }
    }

    println!();
    println!("Checksum: {}", report.checksum.dimmed());
    println!("Time: {:.3}s", elapsed_secs);
}

fn colorize_severity(severity: &str) -> colored::ColoredString {
    match severity.to_ascii_uppercase().as_str() {
        "HIGH" => severity.bright_red().bold(),
        "MEDIUM" => severity.bright_yellow(),
        "LOW" => severity.bright_green(),
        _ => severity.normal(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
