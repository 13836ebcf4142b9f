//! Clap derive structures for the `slotbook` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can compile it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// slotbook -- book appointment time slots from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "slotbook",
    version,
    about = "Book appointment time slots from the command line",
    long_about = "Check which time slots are free on a date and book one against a\n\
        spreadsheet-backed booking endpoint.\n\n\
        Endpoints are configured as profiles (see `slotbook config init`) or\n\
        passed directly with --endpoint.",
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
    /// Endpoint profile to use
    #[arg(long, short = 'p', env = "SLOTBOOK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Booking endpoint URL (overrides profile)
    #[arg(long, short = 'e', env = "SLOTBOOK_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SLOTBOOK_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Never prompt; fail on missing values instead
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Request timeout in seconds (0 waits indefinitely)
    #[arg(long, env = "SLOTBOOK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Show the time slots of a date
    #[command(alias = "ls")]
    Slots(SlotsArgs),

    /// Book a time slot
    #[command(alias = "b")]
    Book(BookArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SLOTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SlotsArgs {
    /// Date to show (YYYY-MM-DD, "today" or "tomorrow") [default: today]
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Only list slots that can still be booked
    #[arg(long, short = 'a')]
    pub available: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BOOK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Values left out are prompted for, unless --no-input is set.
#[derive(Debug, Args)]
pub struct BookArgs {
    /// Date to book (YYYY-MM-DD, "today" or "tomorrow")
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Time slot label, e.g. "09:20 - 10:00"
    #[arg(long, short = 's')]
    pub slot: Option<String>,

    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Address
    #[arg(long)]
    pub address: Option<String>,

    /// Phone number (at least 10 digits)
    #[arg(long)]
    pub phone: Option<String>,

    /// Test type code
    #[arg(long, short = 't')]
    pub test_type: Option<String>,

    /// Retry over the fallback transport without asking if the primary fails.
    /// The booking details are then sent as URL query parameters.
    #[arg(long)]
    pub fallback: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set the endpoint URL of a profile (the active one unless --profile)
    SetEndpoint {
        /// Endpoint URL
        url: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
