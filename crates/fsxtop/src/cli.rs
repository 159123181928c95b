//! Clap derive structures for the `fsxtop` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fsxtop -- capacity, performance and cost of Amazon FSx file systems
#[derive(Debug, Parser)]
#[command(
    name = "fsxtop",
    version,
    about = "Monitor Amazon FSx file systems from the terminal",
    long_about = "Lists every FSx file system in a region with capacity, throughput, IOPS,\n\
        CPU and estimated monthly cost, or drills into one file system to show its\n\
        volumes (ONTAP, OpenZFS) or metadata servers (Lustre).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// AWS region
    #[arg(long, short = 'r', env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// AWS named profile
    #[arg(long, short = 'p', env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "FSXTOP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

// ── Output Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List file systems in the region
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one file system with its volumes or metadata servers
    #[command(alias = "get")]
    Show(ShowArgs),

    /// Inspect the configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by the monitoring views.
#[derive(Debug, Args)]
pub struct ViewOpts {
    /// Sort as field=asc|dsc
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Keep refreshing until Ctrl-C
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Hide cost columns and totals
    #[arg(long)]
    pub disable_pricing: bool,

    /// Colours for the good, ok and bad utilization bands
    #[arg(long, value_name = "GOOD,OK,BAD")]
    pub style: Option<String>,

    /// Seconds between file system refreshes (watch mode)
    #[arg(long, value_name = "SECS")]
    pub refresh_interval: Option<u64>,

    /// Seconds between metric refreshes (watch mode)
    #[arg(long, value_name = "SECS")]
    pub metric_interval: Option<u64>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only this file system type
    #[arg(
        long = "type",
        short = 't',
        ignore_case = true,
        value_parser = ["LUSTRE", "WINDOWS", "ONTAP", "OPENZFS"]
    )]
    pub file_system_type: Option<String>,

    /// Only names containing this text (case-insensitive)
    #[arg(long, short = 'n')]
    pub name_filter: Option<String>,

    #[command(flatten)]
    pub view: ViewOpts,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// File system id, e.g. fs-0123456789abcdef0 (defaults to file_system_id from config)
    pub file_system_id: Option<String>,

    #[command(flatten)]
    pub view: ViewOpts,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
