// fwedit-core: Undo-capable revision editor for firewall rule sets.
//
// Edits to inbound and outbound rules are tracked as per-rule revision
// history and leave the client only as one bulk update. Backend
// validation errors are mapped back onto the revisions they concern.

pub mod editor;
pub mod error;
pub mod form;
pub mod model;
pub mod reconcile;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use editor::{Applied, EditAction, IgnoreReason, PreparedRule, RevisionStore, reduce};
pub use error::CoreError;
pub use reconcile::{ApiError, parse_field_error};
pub use session::{CommitRequest, FirewallEditSession, IndexMode};

pub use model::{
    // Rules
    Category, FirewallRule, FirewallRules, RuleAction, RuleAddresses, RulePatch, RuleProtocol,
    // Revisions
    Revision, RevisionStatus, RuleWithStatus,
    // Errors
    FieldError, FormField, IpFamily, IpRef,
};
