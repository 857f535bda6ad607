//! CLI argument definitions for the GES reconciler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ges_output::DEFAULT_CHUNK_SIZE;

#[derive(Parser)]
#[command(
    name = "ges-reconcile",
    version,
    about = "Build GES trazadora load files from visit and medication exports",
    long_about = "Reconcile hospital visit and medication exports against the GES \
                  eligible population.\n\n\
                  Emits one visit load file and one medication load file with at most \
                  one row per patient and procedure code, plus review, missing-date and \
                  coverage side tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify, deduplicate and write the load files for one snapshot.
    Run(RunArgs),

    /// Print the keyword and specialty rules in effect.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Eligible population registry (identifier + condition).
    #[arg(long, value_name = "CSV")]
    pub population: PathBuf,

    /// Palliative progression classification table.
    #[arg(long, value_name = "CSV")]
    pub progression: Option<PathBuf>,

    /// Fibrosis severity classification table.
    #[arg(long, value_name = "CSV")]
    pub severity: Option<PathBuf>,

    /// Outpatient visit export.
    #[arg(long, value_name = "CSV")]
    pub visits: Option<PathBuf>,

    /// Pharmacy dispensation export.
    #[arg(long, value_name = "CSV")]
    pub dispensations: Option<PathBuf>,

    /// Prescription export.
    #[arg(long, value_name = "CSV")]
    pub prescriptions: Option<PathBuf>,

    /// Output directory for generated files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Maximum data rows per load file before splitting into parts.
    #[arg(
        long = "chunk-size",
        value_name = "ROWS",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = parse_chunk_size
    )]
    pub chunk_size: usize,

    /// Input field delimiter (sniffed per file when omitted). Accepts `tab`.
    #[arg(long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Map unrecognized condition labels to the unknown condition instead
    /// of aborting the run.
    #[arg(long = "lenient-conditions")]
    pub lenient_conditions: bool,

    /// Skip the per-member coverage report.
    #[arg(long = "no-cross-report")]
    pub no_cross_report: bool,

    /// Write the run summary as JSON to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    /// Classify and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Replace the embedded rules with a TOML file.
    #[arg(long, value_name = "TOML")]
    pub rules: Option<PathBuf>,

    /// Append a local timestamp to every output file name.
    #[arg(long)]
    pub stamp: bool,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Show this TOML file instead of the embedded rules.
    #[arg(long, value_name = "TOML")]
    pub rules: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_chunk_size(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(error) => Err(error.to_string()),
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
        _ => Err(format!("expected a single ASCII character, got `{raw}`")),
    }
}
