//! Command dispatch: bridges CLI args -> edit session -> output formatting.

pub mod config_cmd;
pub mod edit;
pub mod reconcile;
pub mod show;
pub mod util;
pub mod validate;
pub mod view;

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

/// Dispatch a rule command to the appropriate handler.
pub fn dispatch(cmd: Command, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        Command::Show(args) => show::handle(&args, settings),
        Command::Edit(args) => edit::handle(&args, settings),
        Command::Reconcile(args) => reconcile::handle(&args, settings),
        Command::Validate(args) => validate::handle(&args, settings),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
