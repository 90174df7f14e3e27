//! `show` handler: the loaded rules, all unmodified.

use fwedit_core::FirewallEditSession;

use crate::cli::ShowArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;
use super::view::RulesView;

pub fn handle(args: &ShowArgs, settings: &Settings) -> Result<(), CliError> {
    let rules = util::read_rules(&args.rules)?;
    let session = FirewallEditSession::new(&rules, settings.index_mode);

    let view = RulesView::from_session(&session, args.category.map(util::to_category));
    let color = output::should_color(settings.color);
    let out = output::render_single(settings.output, &view, |v| v.detail(color), RulesView::plain);
    output::print_output(&out, settings.quiet);
    Ok(())
}
