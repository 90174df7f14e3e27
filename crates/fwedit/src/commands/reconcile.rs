//! `reconcile` handler: replay the edits behind a rejected commit and
//! attach the backend's validation errors to the rules they concern.

use std::fmt::Write;

use serde::Serialize;
use tracing::info;

use fwedit_core::{ApiError, FirewallEditSession};

use crate::cli::ReconcileArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;
use super::view::RulesView;

#[derive(Debug, Serialize)]
struct ReconcileView {
    rules: RulesView,
    general_errors: Vec<ApiError>,
}

impl ReconcileView {
    fn detail(&self, color: bool) -> String {
        let mut out = self.rules.detail(color);

        let scoped = self.rules.error_detail();
        if !scoped.is_empty() {
            let _ = write!(out, "\n\nRule errors:\n{}", scoped.trim_end());
        }
        if !self.general_errors.is_empty() {
            let _ = write!(out, "\n\nGeneral errors:");
            for err in &self.general_errors {
                let _ = write!(out, "\n  - {}", describe(err));
            }
        }
        out
    }

    fn plain(&self) -> String {
        let mut lines: Vec<String> = self
            .rules
            .error_detail()
            .lines()
            .map(str::to_owned)
            .collect();
        lines.extend(self.general_errors.iter().map(describe));
        lines.join("\n")
    }
}

fn describe(err: &ApiError) -> String {
    match &err.field {
        Some(field) => format!("{field}: {}", err.reason),
        None => err.reason.clone(),
    }
}

pub fn handle(args: &ReconcileArgs, settings: &Settings) -> Result<(), CliError> {
    let rules = util::read_rules(&args.rules)?;
    let errors = util::read_errors(&args.errors)?;

    let mut session = FirewallEditSession::new(&rules, settings.index_mode);
    if let Some(ref script) = args.script {
        util::apply_script(&mut session, util::read_script(script)?)?;
    }

    let request = session.commit_request();
    let general_errors = session.apply_commit_failure(&request, &errors);
    info!(
        received = errors.len(),
        general = general_errors.len(),
        "backend errors reconciled"
    );

    let view = ReconcileView {
        rules: RulesView::from_session(&session, None),
        general_errors,
    };
    let color = output::should_color(settings.color);
    let out = output::render_single(
        settings.output,
        &view,
        |v| v.detail(color),
        ReconcileView::plain,
    );
    output::print_output(&out, settings.quiet);
    Ok(())
}
