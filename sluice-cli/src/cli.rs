//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sluice -- object-storage log normalization pipeline.
///
/// Use `sluice <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sluice", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sluice.toml configuration file.
    #[arg(short, long, default_value = "sluice.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process objects through the parsing pipeline.
    Run(RunArgs),

    /// List format identifiers known to the registry.
    Formats,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Route, fetch and parse objects, then report the handler result.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Objects to process, as BUCKET/KEY (the first `/` separates bucket
    /// from key).
    pub objects: Vec<String>,

    /// JSON file containing an array of `{bucket_name, object_key}` events.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Override the configured handler name (count, jsonl).
    #[arg(long)]
    pub handler: Option<String>,
}

// ---- config ----

/// Manage sluice configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, routing, handler).
        #[arg(long)]
        section: Option<String>,
    },
}
