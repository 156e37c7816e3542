//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// market-unify - Cross-market quote unification.
#[derive(Parser, Debug)]
#[command(name = "market-unify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logging: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Group quotes by event and write unified products as JSON
    Unify(UnifyArgs),

    /// Print the comparison key for each name
    Normalize(NormalizeArgs),

    /// Validate a configuration file
    CheckConfig(ConfigArgs),
}

/// Logging flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Engine configuration flags.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override matching.similarity_threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Override matching.measure (lcs, levenshtein, jaro_winkler)
    #[arg(long)]
    pub measure: Option<String>,
}

/// Arguments for the `unify` subcommand.
#[derive(Args, Debug)]
pub struct UnifyArgs {
    /// JSON files, each an array of quote records
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pub pretty: bool,

    /// Only emit products whose cross-source spread exceeds this value
    #[arg(long)]
    pub min_spread: Option<f64>,
}

/// Arguments for the `normalize` subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Names to normalize
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}
