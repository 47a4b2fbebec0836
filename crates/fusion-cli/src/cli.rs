//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fusion",
    version,
    about = "Reconcile PCR/LIS exports and qualify runs against PQ criteria",
    long_about = "Pair PCR and LIS export files, combine them into one row per specimen,\n\
                  and evaluate every specimen against the assay's qualification rules.\n\
                  Writes the combined table, per-run PQ results and run statistics."
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

    /// Allow specimen barcodes in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pair, combine and qualify export files, then write the results.
    Run(RunArgs),

    /// Show how export files pair up without processing them.
    Pair(PairArgs),

    /// List the built-in assay profiles.
    Profiles,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Export files or directories containing them.
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Built-in assay profile name or alias.
    #[arg(long = "profile", default_value = "paraflu")]
    pub profile: String,

    /// Assay profile TOML file (takes precedence over --profile).
    #[arg(long = "profile-file", value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Instrument registry TOML mapping devices to serials and software versions.
    #[arg(long = "instruments", value_name = "PATH")]
    pub instruments: Option<PathBuf>,

    /// Output directory (default: <first input>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Column used to group run statistics.
    #[arg(long = "group-by", value_name = "COLUMN", default_value = "Run ID")]
    pub group_by: String,

    /// Barcode label marking positive panels; replaces the profile's labels (repeatable).
    #[arg(long = "pos-label", value_name = "LABEL")]
    pub pos_labels: Vec<String>,

    /// Barcode label marking negative controls; replaces the profile's labels (repeatable).
    #[arg(long = "neg-label", value_name = "LABEL")]
    pub neg_labels: Vec<String>,

    /// Drop LIS specimens without PCR rows instead of keeping them blank.
    #[arg(long = "divert-unmatched")]
    pub divert_unmatched: bool,

    /// Process and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct PairArgs {
    /// Export files or directories containing them.
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,
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
