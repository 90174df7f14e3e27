//! Clap derive structures for the `fwedit` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwedit -- offline firewall rule editor
#[derive(Debug, Parser)]
#[command(
    name = "fwedit",
    version,
    about = "Edit firewall rule sets with per-rule undo",
    long_about = "Apply edit scripts to a firewall rule document, preview the bulk update\n\
        payload, and map backend validation errors back onto the edited rules.\n\n\
        Rule documents, edit scripts and error lists are read as JSON or YAML\n\
        (chosen by file extension).",
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
    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "FWEDIT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Fail on edit actions that address missing or deleted rules
    #[arg(long, global = true)]
    pub strict: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one rule per line (scripting)
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

/// Restrict output to one rule direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryFilter {
    Inbound,
    Outbound,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the rules of a rule document
    #[command(alias = "ls")]
    Show(ShowArgs),

    /// Apply an edit script and show the result
    Edit(EditArgs),

    /// Map backend validation errors onto an edited rule set
    Reconcile(ReconcileArgs),

    /// Run the rule form validation on a single rule
    Validate(ValidateArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Rule commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Rule document (inbound, outbound and both policies)
    pub rules: PathBuf,

    /// Only show one direction
    #[arg(long)]
    pub category: Option<CategoryFilter>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Rule document to start from
    pub rules: PathBuf,

    /// Edit script: a list of `{ category, action }` steps
    #[arg(long, short = 's')]
    pub script: PathBuf,

    /// Print the bulk update payload instead of the edited rules
    #[arg(long)]
    pub payload: bool,

    /// Only show one direction
    #[arg(long, conflicts_with = "payload")]
    pub category: Option<CategoryFilter>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Rule document the edits were made against
    pub rules: PathBuf,

    /// Edit script that produced the rejected commit
    #[arg(long, short = 's')]
    pub script: Option<PathBuf>,

    /// Backend error response: a list of `{ field, reason }` or `{ errors: [...] }`
    #[arg(long, short = 'e')]
    pub errors: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Single rule document
    pub rule: PathBuf,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set a configuration value (e.g. editor.strict_indices true)
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
