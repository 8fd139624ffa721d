//! Batch reporting: what a run created, what it skipped, and why.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::import::normalize::NormalizedRecord;
use crate::store::AccountId;

/// A row that was skipped or failed, with enough context for operator
/// remediation.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Zero-based data row index (the header is not counted).
    pub row: usize,
    /// Username at the point of failure; may be empty when the row never
    /// produced one.
    pub username: String,
    /// Email at the point of failure; may be empty.
    pub mail: String,
    /// User-visible description.
    pub message: String,
}

/// Accumulated outcome of one import run. Not mutated after the run
/// completes.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    /// Successfully created accounts, keyed by the identifier the store
    /// assigned. Every key corresponds to an account actually persisted.
    pub created: BTreeMap<AccountId, NormalizedRecord>,
    /// Row-local failures, in row order.
    pub failures: Vec<RowFailure>,
    /// Set when the batch halted early on a fatal parse condition. The
    /// offending row is counted neither as success nor as failure.
    pub aborted: Option<String>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts created.
    pub fn success_count(&self) -> usize {
        self.created.len()
    }

    /// Number of rows skipped or failed.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when the run created nothing.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        format!(
            "Imported: {} users, {} failures{}",
            self.success_count(),
            self.failure_count(),
            if self.aborted.is_some() {
                ", batch aborted"
            } else {
                ""
            }
        )
    }
}
