// ── Revision types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::field_error::FieldError;
use super::rule::FirewallRule;

/// Edit state of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RevisionStatus {
    /// Imported from the server; only ever the head of a revision list.
    NotModified,
    /// Created client-side and never persisted.
    New,
    Modified,
    PendingDeletion,
}

/// One immutable snapshot of a rule plus its edit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(flatten)]
    pub rule: FirewallRule,
    pub status: RevisionStatus,
    /// Position of the rule when the store was seeded. `None` for rules
    /// created client-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl Revision {
    pub(crate) fn seeded(rule: FirewallRule, original_index: usize) -> Self {
        Self {
            rule,
            status: RevisionStatus::NotModified,
            original_index: Some(original_index),
            errors: Vec::new(),
        }
    }

    pub(crate) fn new_rule(rule: FirewallRule) -> Self {
        Self {
            rule,
            status: RevisionStatus::New,
            original_index: None,
            errors: Vec::new(),
        }
    }

    /// Successor revision: same bookkeeping, new rule and status, no errors.
    pub(crate) fn successor(&self, rule: FirewallRule, status: RevisionStatus) -> Self {
        Self {
            rule,
            status,
            original_index: self.original_index,
            errors: Vec::new(),
        }
    }
}

/// Projection row: the current revision of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWithStatus {
    /// Slot index in the revision store; address edit actions with this.
    pub slot: usize,
    #[serde(flatten)]
    pub rule: FirewallRule,
    pub status: RevisionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}
