// ── Projection ──
//
// Read-only views of a revision store: the current rule list shown in
// the table and the "has unsaved edits" flags.

use crate::model::{FirewallRule, RevisionStatus, RuleWithStatus};

use super::store::RevisionStore;

impl RevisionStore {
    /// Current rule of every non-empty slot, in table order.
    pub fn current_rules(&self) -> Vec<FirewallRule> {
        self.slots()
            .iter()
            .filter_map(|list| list.last())
            .map(|rev| rev.rule.clone())
            .collect()
    }

    /// Like [`current_rules`](Self::current_rules), keeping the edit
    /// bookkeeping and the slot each row came from.
    pub fn current_rules_with_status(&self) -> Vec<RuleWithStatus> {
        self.slots()
            .iter()
            .enumerate()
            .filter_map(|(slot, list)| {
                list.last().map(|rev| RuleWithStatus {
                    slot,
                    rule: rev.rule.clone(),
                    status: rev.status,
                    original_index: rev.original_index,
                    errors: rev.errors.clone(),
                })
            })
            .collect()
    }

    /// True when any visible rule carries an edit status.
    pub fn has_pending_changes(&self) -> bool {
        self.slots()
            .iter()
            .filter_map(|list| list.last())
            .any(|rev| rev.status != RevisionStatus::NotModified)
    }

    /// True when the loaded rules no longer appear in load order.
    ///
    /// Reordering does not touch revision status, so this is tracked
    /// separately from [`has_pending_changes`](Self::has_pending_changes).
    pub fn has_reordered(&self) -> bool {
        let originals: Vec<usize> = self
            .slots()
            .iter()
            .filter_map(|list| list.first())
            .filter_map(|head| head.original_index)
            .collect();
        originals.windows(2).any(|pair| pair[0] > pair[1])
    }
}
