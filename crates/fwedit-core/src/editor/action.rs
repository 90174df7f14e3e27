// ── Edit actions ──
//
// The closed set of transitions the rule table and drawers can request.
// Every index addresses a slot of the revision store, not a row of the
// projected list (the two differ once an undone new rule leaves an empty
// slot behind).

use serde::{Deserialize, Serialize};

use crate::model::{FieldError, FirewallRule, RulePatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditAction {
    /// Append a client-created rule in its own slot.
    NewRule { rule: FirewallRule },
    /// Append a new slot holding a copy of slot `idx`'s current rule.
    CloneRule { idx: usize },
    /// Mark the rule in slot `idx` for deletion.
    DeleteRule { idx: usize },
    /// Merge `rule` onto the current revision of slot `idx`.
    ModifyRule { idx: usize, rule: RulePatch },
    /// Drop the latest revision of slot `idx`.
    Undo { idx: usize },
    /// Move the slot at `start_idx` so it ends up at `end_idx`.
    Reorder { start_idx: usize, end_idx: usize },
    /// Back to the rules as loaded, in load order.
    DiscardChanges,
    /// Re-seed from fresh server rules.
    Reset { rules: Vec<FirewallRule> },
    /// Attach a backend validation error to the current revision of `idx`.
    SetError { idx: usize, error: FieldError },
}

impl EditAction {
    /// Action name as used in edit scripts and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewRule { .. } => "NEW_RULE",
            Self::CloneRule { .. } => "CLONE_RULE",
            Self::DeleteRule { .. } => "DELETE_RULE",
            Self::ModifyRule { .. } => "MODIFY_RULE",
            Self::Undo { .. } => "UNDO",
            Self::Reorder { .. } => "REORDER",
            Self::DiscardChanges => "DISCARD_CHANGES",
            Self::Reset { .. } => "RESET",
            Self::SetError { .. } => "SET_ERROR",
        }
    }
}

/// Outcome of applying one action to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Ignored(IgnoreReason),
}

impl Applied {
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Why an action left the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    IndexOutOfRange { idx: usize, len: usize },
    /// The slot's only revision was a new rule that has been undone.
    EmptySlot { idx: usize },
    /// Edits are refused until the deletion is undone.
    PendingDeletion { idx: usize },
    /// Undo cannot go past the revision loaded from the server.
    AtOriginal { idx: usize },
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { idx, len } => {
                write!(f, "index {idx} out of range (len {len})")
            }
            Self::EmptySlot { idx } => write!(f, "slot {idx} has no revisions"),
            Self::PendingDeletion { idx } => write!(f, "slot {idx} is pending deletion"),
            Self::AtOriginal { idx } => write!(f, "slot {idx} is already at its original revision"),
        }
    }
}
