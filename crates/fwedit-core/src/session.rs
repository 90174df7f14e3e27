// ── Edit session ──
//
// Orchestrates one firewall's rule editing: two independent revision
// stores (inbound / outbound), the two default policies, and the
// commit round trip. The session never talks to the network; it builds
// the bulk update payload and consumes the backend's answer.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::editor::{Applied, EditAction, IgnoreReason, RevisionStore};
use crate::error::CoreError;
use crate::model::{Category, FieldError, FirewallRules, RuleAction, RuleWithStatus};
use crate::reconcile::ApiError;

/// How `dispatch` treats actions the store refuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Refused actions are silent no-ops.
    #[default]
    Lenient,
    /// Refused actions surface as `CoreError`s.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Policies {
    inbound: RuleAction,
    outbound: RuleAction,
}

impl Policies {
    fn from_rules(rules: &FirewallRules) -> Self {
        Self {
            inbound: rules.inbound_policy,
            outbound: rules.outbound_policy,
        }
    }
}

/// The single bulk update body, plus the map from submitted rule
/// positions back to store slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    pub payload: FirewallRules,
    #[serde(skip)]
    inbound_slots: Vec<usize>,
    #[serde(skip)]
    outbound_slots: Vec<usize>,
}

impl CommitRequest {
    /// Store slot of the `idx`-th submitted rule of `category`.
    pub fn slot_for(&self, category: Category, idx: usize) -> Option<usize> {
        match category {
            Category::Inbound => self.inbound_slots.get(idx).copied(),
            Category::Outbound => self.outbound_slots.get(idx).copied(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FirewallEditSession {
    inbound: RevisionStore,
    outbound: RevisionStore,
    policies: Policies,
    baseline: Policies,
    mode: IndexMode,
}

impl FirewallEditSession {
    pub fn new(rules: &FirewallRules, mode: IndexMode) -> Self {
        let policies = Policies::from_rules(rules);
        Self {
            inbound: RevisionStore::seed(&rules.inbound),
            outbound: RevisionStore::seed(&rules.outbound),
            policies,
            baseline: policies,
            mode,
        }
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn store(&self, category: Category) -> &RevisionStore {
        match category {
            Category::Inbound => &self.inbound,
            Category::Outbound => &self.outbound,
        }
    }

    fn store_mut(&mut self, category: Category) -> &mut RevisionStore {
        match category {
            Category::Inbound => &mut self.inbound,
            Category::Outbound => &mut self.outbound,
        }
    }

    /// Apply one action to the store of `category`.
    pub fn dispatch(
        &mut self,
        category: Category,
        action: EditAction,
    ) -> Result<Applied, CoreError> {
        debug!(%category, action = action.name(), "dispatch");
        let len = self.store(category).len();
        let outcome = self.store_mut(category).apply(action);

        match (self.mode, outcome) {
            (IndexMode::Strict, Applied::Ignored(reason)) => {
                strict_error(category, reason, len).map_or(Ok(outcome), Err)
            }
            _ => Ok(outcome),
        }
    }

    pub fn rules_with_status(&self, category: Category) -> Vec<RuleWithStatus> {
        self.store(category).current_rules_with_status()
    }

    // ── Policies ─────────────────────────────────────────────────────

    pub fn policy(&self, category: Category) -> RuleAction {
        match category {
            Category::Inbound => self.policies.inbound,
            Category::Outbound => self.policies.outbound,
        }
    }

    pub fn set_policy(&mut self, category: Category, policy: RuleAction) {
        debug!(%category, %policy, "policy changed");
        match category {
            Category::Inbound => self.policies.inbound = policy,
            Category::Outbound => self.policies.outbound = policy,
        }
    }

    /// Rule edits, reorders or policy changes not yet committed.
    pub fn has_unsaved_changes(&self) -> bool {
        [&self.inbound, &self.outbound]
            .iter()
            .any(|store| store.has_pending_changes() || store.has_reordered())
            || self.policies != self.baseline
    }

    // ── Commit round trip ────────────────────────────────────────────

    pub fn commit_request(&self) -> CommitRequest {
        let inbound = self.inbound.prepare_rules();
        let outbound = self.outbound.prepare_rules();

        CommitRequest {
            inbound_slots: inbound.iter().map(|p| p.slot).collect(),
            outbound_slots: outbound.iter().map(|p| p.slot).collect(),
            payload: FirewallRules {
                inbound: inbound.into_iter().map(|p| p.rule).collect(),
                outbound: outbound.into_iter().map(|p| p.rule).collect(),
                inbound_policy: self.policies.inbound,
                outbound_policy: self.policies.outbound,
            },
        }
    }

    /// Re-seed both stores from the rules the backend returned.
    pub fn apply_commit_success(&mut self, saved: &FirewallRules) {
        self.inbound.apply(EditAction::Reset {
            rules: saved.inbound.clone(),
        });
        self.outbound.apply(EditAction::Reset {
            rules: saved.outbound.clone(),
        });
        self.policies = Policies::from_rules(saved);
        self.baseline = self.policies;
    }

    /// Attach backend validation errors to the revisions they concern.
    ///
    /// Rule edits are otherwise left exactly as they were. Returns the
    /// errors that could not be tied to a rule, to be shown as general
    /// errors.
    pub fn apply_commit_failure(
        &mut self,
        request: &CommitRequest,
        errors: &[ApiError],
    ) -> Vec<ApiError> {
        let mut general = Vec::new();
        for err in errors {
            let Some(scoped) = FieldError::from_api_error(err) else {
                general.push(err.clone());
                continue;
            };
            let Some(slot) = request.slot_for(scoped.category, scoped.idx) else {
                warn!(
                    category = %scoped.category,
                    idx = scoped.idx,
                    "error refers to a rule that was not submitted"
                );
                general.push(err.clone());
                continue;
            };

            let category = scoped.category;
            let outcome = self.store_mut(category).apply(EditAction::SetError {
                idx: slot,
                error: scoped,
            });
            if !outcome.is_changed() {
                general.push(err.clone());
            }
        }
        general
    }

    /// Drop every local edit and restore the loaded policies.
    pub fn discard_changes(&mut self) {
        self.inbound.apply(EditAction::DiscardChanges);
        self.outbound.apply(EditAction::DiscardChanges);
        self.policies = self.baseline;
    }
}

/// Refusals that abort a strict session. Undo at the original revision
/// stays a plain no-op.
fn strict_error(category: Category, reason: IgnoreReason, len: usize) -> Option<CoreError> {
    match reason {
        IgnoreReason::IndexOutOfRange { idx, .. } => {
            Some(CoreError::IndexOutOfRange { category, idx, len })
        }
        IgnoreReason::PendingDeletion { idx } => Some(CoreError::PendingDeletion { category, idx }),
        IgnoreReason::EmptySlot { .. } => Some(CoreError::ActionIgnored {
            category,
            reason: reason.to_string(),
        }),
        IgnoreReason::AtOriginal { .. } => None,
    }
}
