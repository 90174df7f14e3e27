//! Shared helpers for command handlers: document loading and edit
//! script replay.

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use fwedit_core::{
    ApiError, Applied, Category, EditAction, FirewallEditSession, FirewallRule, FirewallRules,
};

use crate::cli::CategoryFilter;
use crate::error::CliError;

/// One step of an edit script.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub category: Category,
    pub action: EditAction,
}

/// Backend error responses come either bare or wrapped in `errors`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDocument {
    Wrapped { errors: Vec<ApiError> },
    List(Vec<ApiError>),
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Read a JSON or YAML document, picking the parser by file extension.
fn read_document<T: DeserializeOwned>(
    path: &Path,
    kind: &str,
    kind_command: &str,
) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CliError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CliError::Io(e),
    })?;

    let parsed = if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| CliError::Document {
        kind: kind.into(),
        kind_command: kind_command.into(),
        path: path.display().to_string(),
        reason,
    })
}

pub fn read_rules(path: &Path) -> Result<FirewallRules, CliError> {
    read_document(path, "rule document", "show")
}

pub fn read_rule(path: &Path) -> Result<FirewallRule, CliError> {
    read_document(path, "rule", "validate")
}

pub fn read_script(path: &Path) -> Result<Vec<ScriptStep>, CliError> {
    read_document(path, "edit script", "edit")
}

pub fn read_errors(path: &Path) -> Result<Vec<ApiError>, CliError> {
    let doc: ErrorDocument = read_document(path, "error list", "reconcile")?;
    Ok(match doc {
        ErrorDocument::Wrapped { errors } | ErrorDocument::List(errors) => errors,
    })
}

/// Dispatch every step in order. Refused steps are skipped in lenient
/// mode and abort the replay in strict mode.
pub fn apply_script(
    session: &mut FirewallEditSession,
    steps: Vec<ScriptStep>,
) -> Result<(), CliError> {
    let total = steps.len();
    let mut skipped = 0_usize;

    for (n, step) in steps.into_iter().enumerate() {
        let number = n + 1;
        match session.dispatch(step.category, step.action) {
            Ok(Applied::Changed) => {}
            Ok(Applied::Ignored(reason)) => {
                info!(step = number, category = %step.category, %reason, "step skipped");
                skipped += 1;
            }
            Err(err) => return Err(CliError::at_step(number, err)),
        }
    }

    debug!(total, skipped, "edit script applied");
    Ok(())
}

pub fn to_category(filter: CategoryFilter) -> Category {
    match filter {
        CategoryFilter::Inbound => Category::Inbound,
        CategoryFilter::Outbound => Category::Outbound,
    }
}
