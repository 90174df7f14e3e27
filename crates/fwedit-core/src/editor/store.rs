// ── Revision store ──
//
// One append-only revision list per rule slot, in table order. All
// mutation goes through `apply`; history is only ever pushed or popped.

use serde::Serialize;
use tracing::debug;

use crate::model::{FieldError, FirewallRule, Revision, RevisionStatus, RulePatch};

use super::action::{Applied, EditAction, IgnoreReason};

/// Ordered revision lists for one rule category.
///
/// A slot is normally non-empty. The exception is a client-created rule
/// whose only revision was undone: the slot stays in place (so indices
/// of later slots remain stable) and the projection skips it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RevisionStore {
    slots: Vec<Vec<Revision>>,
}

impl RevisionStore {
    /// Build a store from server rules, all `NOT_MODIFIED`.
    pub fn seed(rules: &[FirewallRule]) -> Self {
        Self {
            slots: rules
                .iter()
                .enumerate()
                .map(|(idx, rule)| vec![Revision::seeded(rule.clone(), idx)])
                .collect(),
        }
    }

    /// Number of slots, including emptied ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Full revision history of one slot, oldest first.
    pub fn history(&self, idx: usize) -> Option<&[Revision]> {
        self.slots.get(idx).map(Vec::as_slice)
    }

    /// Current (latest) revision of one slot.
    pub fn current(&self, idx: usize) -> Option<&Revision> {
        self.slots.get(idx).and_then(|list| list.last())
    }

    pub(crate) fn slots(&self) -> &[Vec<Revision>] {
        &self.slots
    }

    /// Apply one action in place.
    pub fn apply(&mut self, action: EditAction) -> Applied {
        let name = action.name();
        let outcome = match action {
            EditAction::NewRule { rule } => {
                self.slots.push(vec![Revision::new_rule(rule)]);
                Applied::Changed
            }
            EditAction::CloneRule { idx } => self.clone_rule(idx),
            EditAction::DeleteRule { idx } => self.delete_rule(idx),
            EditAction::ModifyRule { idx, rule } => self.modify_rule(idx, &rule),
            EditAction::Undo { idx } => self.undo(idx),
            EditAction::Reorder { start_idx, end_idx } => self.reorder(start_idx, end_idx),
            EditAction::DiscardChanges => {
                self.discard_changes();
                Applied::Changed
            }
            EditAction::Reset { rules } => {
                *self = Self::seed(&rules);
                Applied::Changed
            }
            EditAction::SetError { idx, error } => self.set_error(idx, error),
        };

        match outcome {
            Applied::Changed => debug!(action = name, slots = self.slots.len(), "applied"),
            Applied::Ignored(reason) => debug!(action = name, %reason, "ignored"),
        }
        outcome
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn clone_rule(&mut self, idx: usize) -> Applied {
        let rule = match self.current_or_ignore(idx) {
            Ok(current) => current.rule.clone(),
            Err(ignored) => return ignored,
        };
        self.slots.push(vec![Revision::new_rule(rule)]);
        Applied::Changed
    }

    fn delete_rule(&mut self, idx: usize) -> Applied {
        let next = match self.current_or_ignore(idx) {
            Ok(current) => current.successor(current.rule.clone(), RevisionStatus::PendingDeletion),
            Err(ignored) => return ignored,
        };
        self.push_revision(idx, next)
    }

    fn modify_rule(&mut self, idx: usize, patch: &RulePatch) -> Applied {
        let next = match self.current_or_ignore(idx) {
            Ok(current) if current.status == RevisionStatus::PendingDeletion => {
                return Applied::Ignored(IgnoreReason::PendingDeletion { idx });
            }
            Ok(current) => current.successor(current.rule.merged(patch), RevisionStatus::Modified),
            Err(ignored) => return ignored,
        };
        self.push_revision(idx, next)
    }

    fn undo(&mut self, idx: usize) -> Applied {
        match self.current_or_ignore(idx) {
            Ok(current) if current.status == RevisionStatus::NotModified => {
                return Applied::Ignored(IgnoreReason::AtOriginal { idx });
            }
            Ok(_) => {}
            Err(ignored) => return ignored,
        }
        if let Some(list) = self.slots.get_mut(idx) {
            list.pop();
        }
        Applied::Changed
    }

    fn reorder(&mut self, start_idx: usize, end_idx: usize) -> Applied {
        let len = self.slots.len();
        for idx in [start_idx, end_idx] {
            if idx >= len {
                return Applied::Ignored(IgnoreReason::IndexOutOfRange { idx, len });
            }
        }
        let moved = self.slots.remove(start_idx);
        self.slots.insert(end_idx, moved);
        Applied::Changed
    }

    /// Keep only rules that were loaded from the server, truncated to
    /// their original revision and put back in load order.
    fn discard_changes(&mut self) {
        let mut originals: Vec<Revision> = self
            .slots
            .iter()
            .filter_map(|list| list.first())
            .filter(|head| head.status == RevisionStatus::NotModified)
            .cloned()
            .map(|mut head| {
                head.errors.clear();
                head
            })
            .collect();
        originals.sort_by_key(|head| head.original_index);
        self.slots = originals.into_iter().map(|head| vec![head]).collect();
    }

    fn set_error(&mut self, idx: usize, error: FieldError) -> Applied {
        if let Err(ignored) = self.current_or_ignore(idx) {
            return ignored;
        }
        if let Some(current) = self.slots.get_mut(idx).and_then(|list| list.last_mut()) {
            current.errors.push(error);
        }
        Applied::Changed
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn current_or_ignore(&self, idx: usize) -> Result<&Revision, Applied> {
        let len = self.slots.len();
        let list = self
            .slots
            .get(idx)
            .ok_or(Applied::Ignored(IgnoreReason::IndexOutOfRange { idx, len }))?;
        list.last()
            .ok_or(Applied::Ignored(IgnoreReason::EmptySlot { idx }))
    }

    fn push_revision(&mut self, idx: usize, revision: Revision) -> Applied {
        match self.slots.get_mut(idx) {
            Some(list) => {
                list.push(revision);
                Applied::Changed
            }
            None => Applied::Ignored(IgnoreReason::IndexOutOfRange {
                idx,
                len: self.slots.len(),
            }),
        }
    }
}

/// Pure reducer form: consume a store and an action, return the next store.
pub fn reduce(mut store: RevisionStore, action: EditAction) -> RevisionStore {
    store.apply(action);
    store
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Category, FormField, RuleAction, RuleAddresses, RuleProtocol};

    fn rule(label: &str, ports: &str) -> FirewallRule {
        FirewallRule {
            action: RuleAction::Accept,
            protocol: RuleProtocol::Tcp,
            ports: Some(ports.into()),
            addresses: Some(RuleAddresses::all()),
            label: Some(label.into()),
            description: None,
            ruleset: None,
        }
    }

    fn seeded() -> RevisionStore {
        RevisionStore::seed(&[rule("ssh", "22"), rule("web", "80")])
    }

    fn statuses(store: &RevisionStore, idx: usize) -> Vec<RevisionStatus> {
        store
            .history(idx)
            .unwrap()
            .iter()
            .map(|r| r.status)
            .collect()
    }

    fn labels(store: &RevisionStore) -> Vec<Option<String>> {
        (0..store.len())
            .map(|idx| store.current(idx).and_then(|r| r.rule.label.clone()))
            .collect()
    }

    #[test]
    fn seed_marks_everything_not_modified() {
        let store = seeded();
        assert_eq!(store.len(), 2);
        for idx in 0..2 {
            let rev = store.current(idx).unwrap();
            assert_eq!(rev.status, RevisionStatus::NotModified);
            assert_eq!(rev.original_index, Some(idx));
        }
    }

    #[test]
    fn new_rule_appends_single_new_revision() {
        let store = reduce(
            seeded(),
            EditAction::NewRule {
                rule: rule("dns", "53"),
            },
        );
        assert_eq!(store.len(), 3);
        assert_eq!(statuses(&store, 2), vec![RevisionStatus::New]);
        assert_eq!(store.current(2).unwrap().original_index, None);
    }

    #[test]
    fn clone_rule_copies_current_revision_as_new() {
        let mut store = seeded();
        store.apply(EditAction::ModifyRule {
            idx: 0,
            rule: RulePatch {
                ports: Some("2222".into()),
                ..RulePatch::default()
            },
        });
        assert!(store.apply(EditAction::CloneRule { idx: 0 }).is_changed());

        let clone = store.current(2).unwrap();
        assert_eq!(clone.status, RevisionStatus::New);
        assert_eq!(clone.rule.ports.as_deref(), Some("2222"));
        assert_eq!(clone.original_index, None);
        assert_eq!(
            store.apply(EditAction::CloneRule { idx: 9 }),
            Applied::Ignored(IgnoreReason::IndexOutOfRange { idx: 9, len: 3 })
        );
    }

    #[test]
    fn delete_appends_pending_deletion() {
        let store = reduce(seeded(), EditAction::DeleteRule { idx: 1 });
        assert_eq!(
            statuses(&store, 1),
            vec![RevisionStatus::NotModified, RevisionStatus::PendingDeletion]
        );
        assert_eq!(store.current(1).unwrap().rule, rule("web", "80"));
    }

    #[test]
    fn out_of_range_indices_are_noops() {
        let before = seeded();
        for action in [
            EditAction::DeleteRule { idx: 5 },
            EditAction::Undo { idx: 5 },
            EditAction::ModifyRule {
                idx: 5,
                rule: RulePatch::default(),
            },
            EditAction::Reorder {
                start_idx: 0,
                end_idx: 5,
            },
            EditAction::Reorder {
                start_idx: 5,
                end_idx: 0,
            },
            EditAction::SetError {
                idx: 5,
                error: FieldError {
                    category: Category::Inbound,
                    idx: 5,
                    form_field: FormField::Ports,
                    ip: None,
                    reason: "bad port".into(),
                },
            },
        ] {
            let mut store = before.clone();
            assert_eq!(
                store.apply(action),
                Applied::Ignored(IgnoreReason::IndexOutOfRange { idx: 5, len: 2 })
            );
            assert_eq!(store, before);
        }
    }

    #[test]
    fn modify_merges_and_drops_errors() {
        let mut store = seeded();
        store.apply(EditAction::SetError {
            idx: 1,
            error: FieldError {
                category: Category::Inbound,
                idx: 1,
                form_field: FormField::Ports,
                ip: None,
                reason: "bad port".into(),
            },
        });
        assert_eq!(store.current(1).unwrap().errors.len(), 1);

        store.apply(EditAction::ModifyRule {
            idx: 1,
            rule: RulePatch {
                ports: Some("999".into()),
                ..RulePatch::default()
            },
        });

        let current = store.current(1).unwrap();
        assert_eq!(current.status, RevisionStatus::Modified);
        assert_eq!(current.rule.ports.as_deref(), Some("999"));
        assert_eq!(current.rule.label.as_deref(), Some("web"));
        assert!(current.errors.is_empty());
        assert_eq!(current.original_index, Some(1));
    }

    #[test]
    fn modify_refused_while_pending_deletion() {
        let mut store = reduce(seeded(), EditAction::DeleteRule { idx: 0 });
        let outcome = store.apply(EditAction::ModifyRule {
            idx: 0,
            rule: RulePatch {
                ports: Some("23".into()),
                ..RulePatch::default()
            },
        });
        assert_eq!(
            outcome,
            Applied::Ignored(IgnoreReason::PendingDeletion { idx: 0 })
        );

        store.apply(EditAction::Undo { idx: 0 });
        assert!(
            store
                .apply(EditAction::ModifyRule {
                    idx: 0,
                    rule: RulePatch::default(),
                })
                .is_changed()
        );
    }

    #[test]
    fn undo_is_bounded_by_original_revision() {
        let mut store = seeded();
        for ports in ["1", "2", "3"] {
            store.apply(EditAction::ModifyRule {
                idx: 0,
                rule: RulePatch {
                    ports: Some(ports.into()),
                    ..RulePatch::default()
                },
            });
        }
        store.apply(EditAction::DeleteRule { idx: 0 });
        assert_eq!(store.history(0).unwrap().len(), 5);

        for _ in 0..10 {
            store.apply(EditAction::Undo { idx: 0 });
        }
        assert_eq!(statuses(&store, 0), vec![RevisionStatus::NotModified]);
        assert_eq!(
            store.apply(EditAction::Undo { idx: 0 }),
            Applied::Ignored(IgnoreReason::AtOriginal { idx: 0 })
        );
    }

    #[test]
    fn undo_of_new_rule_leaves_empty_slot() {
        let mut store = seeded();
        store.apply(EditAction::NewRule {
            rule: rule("dns", "53"),
        });
        store.apply(EditAction::Undo { idx: 2 });

        assert_eq!(store.len(), 3);
        assert!(store.history(2).unwrap().is_empty());
        assert_eq!(
            store.apply(EditAction::Undo { idx: 2 }),
            Applied::Ignored(IgnoreReason::EmptySlot { idx: 2 })
        );
        assert_eq!(
            store.apply(EditAction::DeleteRule { idx: 2 }),
            Applied::Ignored(IgnoreReason::EmptySlot { idx: 2 })
        );
    }

    #[test]
    fn reorder_moves_rather_than_swaps() {
        let two = reduce(
            seeded(),
            EditAction::Reorder {
                start_idx: 1,
                end_idx: 0,
            },
        );
        assert_eq!(labels(&two), vec![Some("web".into()), Some("ssh".into())]);

        let mut three = RevisionStore::seed(&[rule("a", "1"), rule("b", "2"), rule("c", "3")]);
        three.apply(EditAction::Reorder {
            start_idx: 0,
            end_idx: 2,
        });
        assert_eq!(
            labels(&three),
            vec![Some("b".into()), Some("c".into()), Some("a".into())]
        );

        three.apply(EditAction::Reorder {
            start_idx: 2,
            end_idx: 0,
        });
        assert_eq!(
            labels(&three),
            vec![Some("a".into()), Some("b".into()), Some("c".into())]
        );
    }

    #[test]
    fn discard_restores_originals_in_load_order() {
        let mut store = seeded();
        store.apply(EditAction::NewRule {
            rule: rule("dns", "53"),
        });
        store.apply(EditAction::ModifyRule {
            idx: 0,
            rule: RulePatch {
                label: Some("renamed".into()),
                ..RulePatch::default()
            },
        });
        store.apply(EditAction::DeleteRule { idx: 1 });
        store.apply(EditAction::Reorder {
            start_idx: 2,
            end_idx: 0,
        });
        store.apply(EditAction::Reorder {
            start_idx: 2,
            end_idx: 1,
        });

        store.apply(EditAction::DiscardChanges);
        assert_eq!(store, seeded());
    }

    #[test]
    fn reset_reseeds_from_server_rules() {
        let mut store = seeded();
        store.apply(EditAction::DeleteRule { idx: 0 });
        store.apply(EditAction::Reset {
            rules: vec![rule("web", "80")],
        });
        assert_eq!(store, RevisionStore::seed(&[rule("web", "80")]));
    }

    #[test]
    fn set_error_keeps_status_and_rule() {
        let mut store = seeded();
        let error = FieldError {
            category: Category::Outbound,
            idx: 0,
            form_field: FormField::Protocol,
            ip: None,
            reason: "unsupported".into(),
        };
        store.apply(EditAction::SetError {
            idx: 0,
            error: error.clone(),
        });

        let current = store.current(0).unwrap();
        assert_eq!(current.status, RevisionStatus::NotModified);
        assert_eq!(current.errors, vec![error]);
        assert_eq!(store.history(0).unwrap().len(), 1);
    }
}
