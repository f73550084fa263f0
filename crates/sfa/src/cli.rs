//! Clap derive structures for the `sfa` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sfa -- subscribe to a running sing-box engine's command endpoint
#[derive(Debug, Parser)]
#[command(
    name = "sfa",
    version,
    about = "Watch status, groups, logs and clash mode of a running sing-box engine",
    long_about = "Connects to the engine's command endpoint and streams one subscription\n\
        at a time. Connection attempts are retried while the engine starts up.",
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
    /// Engine command endpoint (unix:<path> or tcp:<host>:<port>)
    #[arg(long, short = 'e', env = "SFA_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Config file path (defaults to the platform config dir)
    #[arg(long, env = "SFA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream traffic, memory and connection status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Stream outbound group snapshots
    #[command(alias = "g")]
    Groups(WatchArgs),

    /// Stream engine log lines
    Log(WatchArgs),

    /// Show the clash mode list and follow mode switches
    ClashMode(WatchArgs),

    /// Run the service notification in the terminal
    Notify(NotifyArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subscription Arguments ───────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit after this many payload events
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub watch: WatchArgs,

    /// Status push interval (e.g. "500ms", "2s")
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Profile name shown as the notification title
    #[arg(long, default_value = "")]
    pub profile_name: String,

    /// Show a static notification without live traffic
    #[arg(long = "static")]
    pub static_only: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
