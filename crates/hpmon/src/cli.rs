//! Clap derive structures for the `hpmon` CLI.
//!
//! Also compiled by build.rs for man page generation, so this file may
//! only depend on clap, clap_complete and std.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hpmon -- HP printer page-count sampler
#[derive(Debug, Parser)]
#[command(
    name = "hpmon",
    version,
    about = "Sample HP printer page counters into a round-robin store",
    long_about = "Fetches the usage page from an HP printer's embedded web server over\n\
        HTTPS pinned to a CA certificate, reads the lifetime simplex and duplex\n\
        page counts, and records them in an hourly round-robin store.\n\n\
        Run it from cron once an hour. Without a subcommand, `sample` runs.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: ./conf.toml, ./conf.json, then the user config dir)
    #[arg(long, short = 'c', env = "HPMON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Append log lines to this file (overrides `logfile` in the config)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, whitespace-separated values (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one sampling cycle: bootstrap the store, fetch, extract, write
    Sample,

    /// Fetch the usage page and print the counters without touching the store
    Probe,

    /// Read the counters from a saved usage page
    Extract(ExtractArgs),

    /// Show the store header: step, last update, data sources, archives
    Info,

    /// Print archived rows from the store
    Fetch(FetchArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subcommand Arguments ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved usage page (HTML)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Only rows ending after this time (unix seconds)
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Only rows ending at or before this time (unix seconds)
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file path that would be used
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
