//! External collaborators: account storage and notifications.
//!
//! The pipeline never reaches for ambient services; the uniqueness oracle,
//! the account store, and the notification channel are passed in as trait
//! objects at construction. [`MemoryStore`] and [`LogNotifier`] are the
//! reference implementations used by the CLI and the test suite.

use std::collections::{BTreeMap, HashMap};

use crate::error::{NotifyError, StoreError, StoreResult};
use crate::import::NormalizedRecord;

/// Identifier assigned to a persisted account by the store.
pub type AccountId = u64;

// =============================================================================
// Traits
// =============================================================================

/// Persistence collaborator for user accounts, doubling as the uniqueness
/// oracle for handles and email addresses.
///
/// One logical writer per uniqueness namespace is assumed: concurrent
/// batches against the same store can race between a probe and the
/// matching `create`. Callers needing a stronger guarantee must
/// serialize runs externally.
pub trait AccountStore {
    /// Is this handle already taken?
    fn username_exists(&self, handle: &str) -> StoreResult<bool>;

    /// Return the account holding this email address, if any.
    fn find_by_mail(&self, mail: &str) -> StoreResult<Option<AccountId>>;

    /// Persist a new account and return its identifier.
    fn create(&mut self, record: &NormalizedRecord) -> StoreResult<AccountId>;
}

/// Notification channel for newly created accounts.
pub trait Notifier {
    /// Send the administrator-created welcome message.
    fn welcome(&mut self, id: AccountId, record: &NormalizedRecord) -> Result<(), NotifyError>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// In-memory [`AccountStore`] with uniqueness constraints on handle and
/// email, mirroring the backing user table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: BTreeMap<AccountId, NormalizedRecord>,
    by_name: HashMap<String, AccountId>,
    by_mail: HashMap<String, AccountId>,
    next_id: AccountId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing account, as if created by an earlier run.
    /// Used by tests and the CLI's dry-run mode.
    pub fn seed(&mut self, name: &str, mail: &str) -> AccountId {
        let record = NormalizedRecord::seeded(name, mail);
        self.insert(record)
    }

    /// Number of persisted accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Look up a persisted record by id.
    pub fn get(&self, id: AccountId) -> Option<&NormalizedRecord> {
        self.accounts.get(&id)
    }

    fn insert(&mut self, record: NormalizedRecord) -> AccountId {
        self.next_id += 1;
        let id = self.next_id;
        self.by_name.insert(record.name.clone(), id);
        self.by_mail.insert(record.mail.clone(), id);
        self.accounts.insert(id, record);
        id
    }
}

impl AccountStore for MemoryStore {
    fn username_exists(&self, handle: &str) -> StoreResult<bool> {
        Ok(self.by_name.contains_key(handle))
    }

    fn find_by_mail(&self, mail: &str) -> StoreResult<Option<AccountId>> {
        Ok(self.by_mail.get(mail).copied())
    }

    fn create(&mut self, record: &NormalizedRecord) -> StoreResult<AccountId> {
        // Uniqueness constraints, as the backing table would enforce them.
        if self.by_name.contains_key(&record.name) {
            return Err(StoreError::Backend(format!(
                "username '{}' violates unique constraint",
                record.name
            )));
        }
        if self.by_mail.contains_key(&record.mail) {
            return Err(StoreError::Backend(format!(
                "email '{}' violates unique constraint",
                record.mail
            )));
        }
        Ok(self.insert(record.clone()))
    }
}

// =============================================================================
// Logging notifier
// =============================================================================

/// [`Notifier`] that logs each welcome message and remembers the targets.
#[derive(Debug, Default)]
pub struct LogNotifier {
    /// Accounts a welcome message was sent to, in order.
    pub sent: Vec<AccountId>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for LogNotifier {
    fn welcome(&mut self, id: AccountId, record: &NormalizedRecord) -> Result<(), NotifyError> {
        tracing::info!(account = id, mail = %record.mail, "Sending welcome email");
        self.sent.push(id);
        Ok(())
    }
}
