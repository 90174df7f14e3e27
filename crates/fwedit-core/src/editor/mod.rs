// ── Rule revision editor ──
//
// Local edits to one category's rules are batched as revision history
// and only leave the client in one bulk commit. The store is mutated
// exclusively through `EditAction`s; projection and commit preparation
// are read-only views over it.

pub mod action;
pub mod commit;
pub mod projection;
pub mod store;

pub use action::{Applied, EditAction, IgnoreReason};
pub use commit::PreparedRule;
pub use store::{RevisionStore, reduce};
