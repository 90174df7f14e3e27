//! Rule table rows and the serializable views shared by `show`, `edit`
//! and `reconcile`.

use std::fmt::Write;

use serde::Serialize;
use tabled::Tabled;

use fwedit_core::form::rule_type_label;
use fwedit_core::reconcile::{address_rows, field_errors};
use fwedit_core::{
    Category, FirewallEditSession, FirewallRule, FirewallRules, RuleAction, RuleWithStatus,
};

use crate::output::{paint_status, render_table};

// ── Rule table row ──────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RuleRow {
    #[tabled(rename = "#")]
    row: usize,
    #[tabled(rename = "Slot")]
    slot: usize,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Type")]
    rule_type: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
    #[tabled(rename = "Errors")]
    errors: usize,
}

impl RuleRow {
    fn new(row: usize, r: &RuleWithStatus, color: bool) -> Self {
        let PayloadRow {
            label,
            action,
            rule_type,
            protocol,
            ports,
            addresses,
            ..
        } = PayloadRow::new(row, &r.rule);
        Self {
            row,
            slot: r.slot,
            status: paint_status(r.status, color),
            label,
            action,
            rule_type,
            protocol,
            ports,
            addresses,
            errors: r.errors.len(),
        }
    }
}

/// Row of the commit payload table; no edit bookkeeping.
#[derive(Tabled)]
pub struct PayloadRow {
    #[tabled(rename = "#")]
    row: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Type")]
    rule_type: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
}

impl PayloadRow {
    fn new(row: usize, rule: &FirewallRule) -> Self {
        Self {
            row,
            label: rule.label.clone().unwrap_or_else(|| "-".into()),
            action: rule.action.to_string(),
            rule_type: rule_type_label(rule).into(),
            protocol: rule.protocol.to_string(),
            ports: rule.ports.clone().filter(|p| !p.is_empty()).unwrap_or_else(|| "-".into()),
            addresses: rule.addresses_label(),
        }
    }
}

// ── Rules view ──────────────────────────────────────────────────────

/// Projected rules of a session, optionally limited to one category.
#[derive(Debug, Serialize)]
pub struct RulesView {
    pub unsaved_changes: bool,
    pub inbound_policy: RuleAction,
    pub outbound_policy: RuleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound: Option<Vec<RuleWithStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound: Option<Vec<RuleWithStatus>>,
}

impl RulesView {
    pub fn from_session(session: &FirewallEditSession, only: Option<Category>) -> Self {
        let wanted = |category: Category| {
            only.is_none_or(|c| c == category)
                .then(|| session.rules_with_status(category))
        };
        Self {
            unsaved_changes: session.has_unsaved_changes(),
            inbound_policy: session.policy(Category::Inbound),
            outbound_policy: session.policy(Category::Outbound),
            inbound: wanted(Category::Inbound),
            outbound: wanted(Category::Outbound),
        }
    }

    fn categories(&self) -> impl Iterator<Item = (Category, RuleAction, &[RuleWithStatus])> {
        [
            (Category::Inbound, self.inbound_policy, self.inbound.as_deref()),
            (Category::Outbound, self.outbound_policy, self.outbound.as_deref()),
        ]
        .into_iter()
        .filter_map(|(category, policy, rules)| rules.map(|r| (category, policy, r)))
    }

    /// Headed table per category.
    pub fn detail(&self, color: bool) -> String {
        let mut out = String::new();
        for (category, policy, rules) in self.categories() {
            let _ = writeln!(out, "{} rules (default policy: {policy})", heading(category));
            if rules.is_empty() {
                let _ = writeln!(out, "  (no rules)");
            } else {
                let rows: Vec<RuleRow> = rules
                    .iter()
                    .enumerate()
                    .map(|(i, r)| RuleRow::new(i, r, color))
                    .collect();
                let _ = writeln!(out, "{}", render_table(&rows));
            }
            let _ = writeln!(out);
        }
        let _ = write!(
            out,
            "Unsaved changes: {}",
            if self.unsaved_changes { "yes" } else { "no" }
        );
        out
    }

    /// One tab-separated line per rule: category, slot, status, label.
    pub fn plain(&self) -> String {
        self.categories()
            .flat_map(|(category, _, rules)| {
                rules.iter().map(move |r| {
                    format!(
                        "{category}\t{}\t{}\t{}",
                        r.slot,
                        r.status,
                        r.rule.label.as_deref().unwrap_or("-")
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Per-rule breakdown of attached backend errors. Empty when no rule
    /// carries errors.
    pub fn error_detail(&self) -> String {
        let mut out = String::new();
        for (category, _, rules) in self.categories() {
            for r in rules.iter().filter(|r| !r.errors.is_empty()) {
                let _ = writeln!(
                    out,
                    "{category} slot {} ({}):",
                    r.slot,
                    r.rule.label.as_deref().unwrap_or("unlabelled")
                );
                for (field, reason) in field_errors(&r.errors) {
                    let _ = writeln!(out, "  {field}: {reason}");
                }
                for row in address_rows(&r.rule, &r.errors) {
                    if let Some(error) = row.error {
                        let _ = writeln!(out, "  address {}: {error}", row.address);
                    }
                }
            }
        }
        out
    }
}

/// The commit payload, rendered as tables per category.
pub fn payload_detail(payload: &FirewallRules) -> String {
    let mut out = String::new();
    for category in [Category::Inbound, Category::Outbound] {
        let rules = payload.rules(category);
        let _ = writeln!(
            out,
            "{} rules (default policy: {})",
            heading(category),
            payload.policy(category)
        );
        if rules.is_empty() {
            let _ = writeln!(out, "  (no rules)");
        } else {
            let rows: Vec<PayloadRow> = rules
                .iter()
                .enumerate()
                .map(|(i, r)| PayloadRow::new(i, r))
                .collect();
            let _ = writeln!(out, "{}", render_table(&rows));
        }
    }
    out.trim_end().to_owned()
}

fn heading(category: Category) -> &'static str {
    match category {
        Category::Inbound => "Inbound",
        Category::Outbound => "Outbound",
    }
}
