//! `edit` handler: replay a script, then show the result or the payload.

use tracing::info;

use fwedit_core::FirewallEditSession;

use crate::cli::EditArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;
use super::view::{RulesView, payload_detail};

pub fn handle(args: &EditArgs, settings: &Settings) -> Result<(), CliError> {
    let rules = util::read_rules(&args.rules)?;
    let steps = util::read_script(&args.script)?;

    let mut session = FirewallEditSession::new(&rules, settings.index_mode);
    util::apply_script(&mut session, steps)?;

    let out = if args.payload {
        let request = session.commit_request();
        info!(
            inbound = request.payload.inbound.len(),
            outbound = request.payload.outbound.len(),
            "commit payload prepared"
        );
        output::render_single(settings.output, &request.payload, payload_detail, |p| {
            p.inbound
                .iter()
                .chain(&p.outbound)
                .map(|r| r.label.clone().unwrap_or_else(|| "-".into()))
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        let view = RulesView::from_session(&session, args.category.map(util::to_category));
        let color = output::should_color(settings.color);
        output::render_single(settings.output, &view, |v| v.detail(color), RulesView::plain)
    };

    output::print_output(&out, settings.quiet);
    Ok(())
}
