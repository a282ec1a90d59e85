//! Clap derive structures for the `omnilogic` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use omnilogic_core::{OmniType, Platform, SpeedPreset, SystemId};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// omnilogic -- inspect OmniLogic pool controller state
#[derive(Debug, Parser)]
#[command(
    name = "omnilogic",
    version,
    about = "Correlate OmniLogic configuration and telemetry from the command line",
    long_about = "Builds the OmniLogic entity index from captured MSPConfig and STATUS\n\
        payloads, inspects individual devices, and replays payload files through\n\
        the live poll coordinator.",
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
    /// Controller profile to use
    #[arg(long, short = 'p', env = "OMNILOGIC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller address (overrides profile)
    #[arg(long, short = 'H', env = "OMNILOGIC_HOST", global = true)]
    pub host: Option<String>,

    /// Controller UDP port (overrides profile)
    #[arg(long, env = "OMNILOGIC_PORT", global = true)]
    pub port: Option<u16>,

    /// Seconds between refresh cycles
    #[arg(long, env = "OMNILOGIC_POLL_INTERVAL", global = true)]
    pub poll_interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "OMNILOGIC_TIMEOUT", global = true)]
    pub timeout: Option<f64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OMNILOGIC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// Build the entity index and list its entries
    #[command(alias = "ls")]
    Index(IndexArgs),

    /// Show one device with its kind-specific readings
    Show(ShowArgs),

    /// Print the flattened device walk of a configuration payload
    Walk(WalkArgs),

    /// Send a command through the replay client and show the predicted state
    Send(SendArgs),

    /// Replay payload files through the poll coordinator until Ctrl-C
    Watch(WatchArgs),

    /// Dump diagnostics: raw payloads, update status and the index
    #[command(alias = "diag")]
    Diagnostics(PayloadArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Payload Arguments ────────────────────────────────────────────────

/// Captured payload files standing in for a live controller.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// MSPConfig XML payload
    #[arg(long, value_name = "XML")]
    pub config: PathBuf,

    /// STATUS telemetry XML payload
    #[arg(long, value_name = "XML")]
    pub telemetry: PathBuf,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[command(flatten)]
    pub payloads: PayloadArgs,

    /// Only entries of this device kind (e.g. filter, relay, heater)
    #[arg(long, short = 'k')]
    pub kind: Option<OmniType>,

    /// Only entries exposed through this platform (e.g. switch, sensor)
    #[arg(long, conflicts_with = "kind")]
    pub platform: Option<Platform>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// System id of the device
    pub system_id: SystemId,

    #[command(flatten)]
    pub payloads: PayloadArgs,
}

#[derive(Debug, Args)]
pub struct WalkArgs {
    /// MSPConfig XML payload
    #[arg(long, value_name = "XML")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub payloads: PayloadArgs,

    /// Exit after this many published updates
    #[arg(long, value_name = "N")]
    pub max_updates: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// System id of the target device
    pub system_id: SystemId,

    #[command(flatten)]
    pub payloads: PayloadArgs,

    #[command(subcommand)]
    pub action: SendAction,
}

#[derive(Debug, Subcommand)]
pub enum SendAction {
    /// Turn the device on
    On,
    /// Turn the device off
    Off,
    /// Run a pump or filter at a speed percentage
    Speed { percent: i64 },
    /// Run a pump or filter at a configured preset speed
    Preset { preset: SpeedPreset },
    /// Change a ColorLogic light show
    Show {
        /// Show code
        #[arg(long)]
        show: Option<i64>,
        /// Animation speed code (0-8)
        #[arg(long)]
        speed: Option<i64>,
        /// Brightness code (0-4)
        #[arg(long)]
        brightness: Option<i64>,
    },
    /// Set a heater's target temperature
    Heat { temperature: i64 },
    /// Enable a heater
    Enable,
    /// Disable a heater
    Disable,
    /// Return the backyard to its idle state
    Restore,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or replace a profile and save the config file
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set the default profile
    SetDefault {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
