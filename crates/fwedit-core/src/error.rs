// ── Core error types ──
//
// The editor itself never fails for expected conditions: malformed field
// paths degrade to general errors and bad indices are absorbed by the
// reducer. These variants cover strict-mode dispatch and form validation.

use thiserror::Error;

use crate::model::Category;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Editor errors ────────────────────────────────────────────────
    #[error("No {category} rule at index {idx} (store has {len} slots)")]
    IndexOutOfRange {
        category: Category,
        idx: usize,
        len: usize,
    },

    #[error("{category} rule {idx} is pending deletion; undo the deletion before editing it")]
    PendingDeletion { category: Category, idx: usize },

    #[error("{category} action ignored: {reason}")]
    ActionIgnored { category: Category, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },
}
