//! CLI argument definitions for the harvester.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use harvest_core::CONFIG_ENV;

#[derive(Parser)]
#[command(
    name = "harvest",
    version,
    about = "Metadata harvester - map source records to linked entities",
    long_about = "Transform raw records from several source systems into extracted\n\
                  entities with stable identifiers.\n\n\
                  Mapping files drive value normalization; cross-source references\n\
                  are resolved by email, name, unit synonym and identifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every extraction step and write entities as NDJSON.
    Run(RunArgs),

    /// List the mapping files found in the mapping directory.
    Mappings(SettingsArgs),
}

/// Where settings come from, plus per-run overrides.
#[derive(Args)]
pub struct SettingsArgs {
    /// Settings file (TOML). Relative paths inside it resolve against its directory.
    #[arg(long = "config", value_name = "FILE", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Directory of mapping files (overrides the settings file).
    #[arg(long = "mapping-dir", value_name = "DIR")]
    pub mapping_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Directory of raw record files (overrides the settings file).
    #[arg(long = "records-dir", value_name = "DIR")]
    pub records_dir: Option<PathBuf>,

    /// NDJSON output file (overrides the settings file).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Transform and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Off,
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
