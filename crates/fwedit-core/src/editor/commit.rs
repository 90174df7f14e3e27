// ── Commit preparation ──
//
// Turns a revision store into the rule list sent in the bulk update.
// Deleted rules are left out, bookkeeping never leaves the store, and
// port-less protocols lose their empty `ports` field.

use serde::Serialize;

use crate::model::{FirewallRule, RevisionStatus};

use super::store::RevisionStore;

/// A rule ready for the wire, plus the slot it came from.
///
/// Backend errors index into the submitted list; `slot` maps that
/// position back onto the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedRule {
    pub slot: usize,
    pub rule: FirewallRule,
}

impl RevisionStore {
    /// Rules to commit, in table order, each tagged with its slot.
    pub fn prepare_rules(&self) -> Vec<PreparedRule> {
        self.current_rules_with_status()
            .into_iter()
            .filter(|row| row.status != RevisionStatus::PendingDeletion)
            .map(|row| PreparedRule {
                slot: row.slot,
                rule: normalize_ports(row.rule),
            })
            .collect()
    }

    /// The bare rule list for the bulk update payload.
    pub fn prepare_for_commit(&self) -> Vec<FirewallRule> {
        self.prepare_rules()
            .into_iter()
            .map(|prepared| prepared.rule)
            .collect()
    }
}

/// Drop an empty `ports` value for protocols that forbid ports. A
/// non-empty value is kept so the backend can reject it.
fn normalize_ports(mut rule: FirewallRule) -> FirewallRule {
    if rule.protocol.forbids_ports() && rule.ports.as_deref() == Some("") {
        rule.ports = None;
    }
    rule
}
