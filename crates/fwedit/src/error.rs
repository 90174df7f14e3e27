//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fwedit_config::ConfigError;
use fwedit_core::{Category, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input documents ──────────────────────────────────────────────
    #[error("File not found: {path}")]
    #[diagnostic(code(fwedit::file_not_found))]
    FileNotFound { path: String },

    #[error("Could not parse {kind} in {path}: {reason}")]
    #[diagnostic(
        code(fwedit::document),
        help(
            "Files ending in .yaml or .yml are read as YAML, anything else as JSON.\n\
             Run: fwedit {kind_command} --help for the expected shape."
        )
    )]
    Document {
        kind: String,
        kind_command: String,
        path: String,
        reason: String,
    },

    // ── Edit scripts ─────────────────────────────────────────────────
    #[error("Edit script step {step} failed")]
    #[diagnostic(code(fwedit::script_step))]
    ScriptStep {
        step: usize,
        #[source]
        source: Box<CliError>,
    },

    #[error("No {category} rule in slot {idx} (store has {len} slots)")]
    #[diagnostic(
        code(fwedit::rule_not_found),
        help("Slot numbers are shown in the Slot column of: fwedit edit <rules> --script <script>")
    )]
    RuleNotFound {
        category: Category,
        idx: usize,
        len: usize,
    },

    #[error("{category} rule in slot {idx} is pending deletion")]
    #[diagnostic(
        code(fwedit::rule_deleted),
        help("Add an UNDO step for slot {idx} before modifying it.")
    )]
    RuleDeleted { category: Category, idx: usize },

    #[error("{category} action refused: {reason}")]
    #[diagnostic(
        code(fwedit::action_refused),
        help("Drop --strict (or editor.strict_indices) to skip refused actions.")
    )]
    ActionRefused { category: Category, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fwedit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(fwedit::config_exists),
        help("Use --force to overwrite it, or edit values with: fwedit config set <key> <value>")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(fwedit::config))]
    Config(Box<ConfigError>),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScriptStep { source, .. } => source.exit_code(),
            Self::FileNotFound { .. } | Self::RuleNotFound { .. } => exit_code::NOT_FOUND,
            Self::Document { .. }
            | Self::RuleDeleted { .. }
            | Self::ActionRefused { .. }
            | Self::Validation { .. }
            | Self::ConfigExists { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attribute an editor error to a 1-based script step.
    pub fn at_step(step: usize, err: CoreError) -> Self {
        Self::ScriptStep {
            step,
            source: Box::new(err.into()),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IndexOutOfRange { category, idx, len } => {
                CliError::RuleNotFound { category, idx, len }
            }
            CoreError::PendingDeletion { category, idx } => CliError::RuleDeleted { category, idx },
            CoreError::ActionIgnored { category, reason } => {
                CliError::ActionRefused { category, reason }
            }
            CoreError::Validation { message } => CliError::Validation {
                field: "rule".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
