// ── Domain model ──
//
// Wire-level rule types shared with the backend, plus the client-only
// revision bookkeeping layered on top of them by the editor.

pub mod field_error;
pub mod revision;
pub mod rule;

// ── Re-exports ──────────────────────────────────────────────────────

pub use field_error::{FieldError, FormField, IpFamily, IpRef};
pub use revision::{Revision, RevisionStatus, RuleWithStatus};
pub use rule::{
    ALL_IPV4, ALL_IPV6, Category, FirewallRule, FirewallRules, PrefixListReference, RuleAction,
    RuleAddresses, RulePatch, RuleProtocol, is_prefix_list,
};
