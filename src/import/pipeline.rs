//! Pipeline orchestration: rows in, accounts and a report out.
//!
//! Processing is strictly sequential; later rows may depend on handles
//! chosen for earlier rows, so there is no parallelism across rows. Each
//! row is attempted exactly once. Row-local failures (duplicate email,
//! storage error on create) are recorded and never abort the batch; only
//! the ≤1-cell separator condition halts early, preserving accounts
//! already created.

use chrono::Utc;

use crate::config::{ImportConfig, NotificationPolicy};
use crate::error::ImportResult;
use crate::import::header::resolve_headers;
use crate::import::normalize::{normalize_row, Normalized};
use crate::import::report::{ImportReport, RowFailure};
use crate::import::username::resolve_username;
use crate::reader::{read_rows, read_rows_from_bytes, RawRow};
use crate::store::{AccountStore, Notifier};

/// User-visible message for the fatal wrong-separator condition.
const SEPARATOR_MESSAGE: &str = "No separation character found. Please check your CSV-file.";

/// The import pipeline with its injected collaborators.
///
/// The store is both the account persistence layer and the uniqueness
/// oracle; the notifier delivers the optional welcome email.
pub struct Importer<'a> {
    config: ImportConfig,
    store: &'a mut dyn AccountStore,
    notifier: &'a mut dyn Notifier,
}

impl<'a> Importer<'a> {
    pub fn new(
        config: ImportConfig,
        store: &'a mut dyn AccountStore,
        notifier: &'a mut dyn Notifier,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
        }
    }

    /// Import from a file on disk.
    pub fn run(&mut self, path: impl AsRef<std::path::Path>) -> ImportResult<ImportReport> {
        let rows = read_rows(path, self.config.separator_byte())?;
        Ok(self.process(rows))
    }

    /// Import from in-memory bytes (an already-received upload).
    pub fn run_bytes(&mut self, bytes: &[u8]) -> ImportResult<ImportReport> {
        let rows = read_rows_from_bytes(bytes, self.config.separator_byte())?;
        Ok(self.process(rows))
    }

    /// Process rows: row 0 is the header, the rest are data.
    fn process(&mut self, rows: Vec<RawRow>) -> ImportReport {
        let mut report = ImportReport::new();
        let created_at = Utc::now();

        let mut rows = rows.into_iter();
        let Some(header_row) = rows.next() else {
            tracing::warn!("Input contains no rows");
            return report;
        };

        if header_row.len() <= 1 {
            tracing::error!("Header row has at most one cell; wrong separator");
            report.aborted = Some(SEPARATOR_MESSAGE.to_string());
            return report;
        }

        let headers = resolve_headers(&header_row, &self.config.fields);
        tracing::info!(
            mapped = headers.len(),
            selected = self.config.fields.len(),
            "Resolved header positions"
        );

        for (row_idx, row) in rows.enumerate() {
            match normalize_row(&row, &headers, &self.config, created_at) {
                Normalized::Fatal => {
                    tracing::error!(row = row_idx, "Row has at most one cell; halting batch");
                    report.aborted = Some(SEPARATOR_MESSAGE.to_string());
                    break;
                }
                Normalized::Reject { reason } => {
                    tracing::warn!(row = row_idx, %reason, "Row rejected");
                    report.failures.push(RowFailure {
                        row: row_idx,
                        username: String::new(),
                        mail: String::new(),
                        message: reason,
                    });
                }
                Normalized::Record(mut record) => {
                    self.create_account(row_idx, &mut record, &mut report);
                }
            }
        }

        tracing::info!(
            created = report.success_count(),
            failures = report.failure_count(),
            aborted = report.aborted.is_some(),
            "Import run finished"
        );
        report
    }

    /// Username resolution, duplicate guard, creation, and notification
    /// for one normalized row. Every failure here is row-local.
    fn create_account(
        &mut self,
        row_idx: usize,
        record: &mut crate::import::normalize::NormalizedRecord,
        report: &mut ImportReport,
    ) {
        // The handle is chosen independently of the email dedup check.
        let handle = match resolve_username(self.store, &record.name) {
            Ok(handle) => handle,
            Err(e) => {
                report.failures.push(RowFailure {
                    row: row_idx,
                    username: record.name.clone(),
                    mail: record.mail.clone(),
                    message: format!(
                        "Could not create user (username: {}) (email: {}); exception: {e}",
                        record.name, record.mail
                    ),
                });
                return;
            }
        };
        record.name = handle;

        // Duplicate guard: one account per email address.
        match self.store.find_by_mail(&record.mail) {
            Ok(Some(existing)) => {
                let message = format!(
                    "Could not create user (username: {}) (email: {}). Email already in use",
                    record.name, record.mail
                );
                tracing::warn!(row = row_idx, existing, "{message}");
                report.failures.push(RowFailure {
                    row: row_idx,
                    username: record.name.clone(),
                    mail: record.mail.clone(),
                    message,
                });
                return;
            }
            Ok(None) => {}
            Err(e) => {
                report.failures.push(RowFailure {
                    row: row_idx,
                    username: record.name.clone(),
                    mail: record.mail.clone(),
                    message: format!(
                        "Could not create user (username: {}) (email: {}); exception: {e}",
                        record.name, record.mail
                    ),
                });
                return;
            }
        }

        // One attempt, no retries; a storage failure never aborts the
        // remaining rows.
        match self.store.create(record) {
            Ok(id) => {
                if self.config.notification == NotificationPolicy::Welcome {
                    if let Err(e) = self.notifier.welcome(id, record) {
                        tracing::warn!(account = id, error = %e, "Welcome notification failed");
                    }
                }
                tracing::info!(account = id, username = %record.name, "User created");
                report.created.insert(id, record.clone());
            }
            Err(e) => {
                let message = format!(
                    "Could not create user (username: {}) (email: {}); exception: {e}",
                    record.name, record.mail
                );
                tracing::error!(row = row_idx, "{message}");
                report.failures.push(RowFailure {
                    row: row_idx,
                    username: record.name.clone(),
                    mail: record.mail.clone(),
                    message,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::import::normalize::NormalizedRecord;
    use crate::store::{AccountId, LogNotifier, MemoryStore};

    fn config() -> ImportConfig {
        ImportConfig::builder()
            .password("default-pw")
            .fields(["pass"])
            .build()
            .unwrap()
    }

    fn run(config: ImportConfig, store: &mut MemoryStore, input: &str) -> ImportReport {
        let mut notifier = LogNotifier::new();
        Importer::new(config, store, &mut notifier)
            .run_bytes(input.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_scenario_duplicate_names_get_suffix_and_password_fallback() {
        // Two rows sharing the name "alice": handles alice and alice1;
        // the second row's empty password cell takes the default.
        let input = "name,mail,pass\nalice,alice@x.com,secret1\nalice,alice2@x.com,\n";
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, input);

        assert_eq!(report.success_count(), 2);
        assert!(report.failures.is_empty());
        assert!(report.aborted.is_none());

        let records: Vec<&NormalizedRecord> = report.created.values().collect();
        assert_eq!(records[0].name, "alice");
        assert_eq!(records[0].pass, "secret1");
        assert_eq!(records[1].name, "alice1");
        assert_eq!(records[1].pass, "default-pw");

        assert!(store.username_exists("alice").unwrap());
        assert!(store.username_exists("alice1").unwrap());
    }

    #[test]
    fn test_scenario_duplicate_email_rejected_batch_continues() {
        let input = "name,mail,pass\n\
                     alice,alice@x.com,secret1\n\
                     alice,alice2@x.com,\n\
                     alice,alice@x.com,pw\n\
                     dave,dave@x.com,\n";
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, input);

        // Row 2 is rejected by the duplicate guard; dave still imports.
        assert_eq!(report.success_count(), 3);
        assert_eq!(report.failure_count(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.row, 2);
        assert_eq!(failure.mail, "alice@x.com");
        assert!(failure.message.contains("Email already in use"));
        assert!(failure.message.contains("alice2"));
    }

    #[test]
    fn test_scenario_single_cell_row_halts_preserving_prefix() {
        let input = "name,mail\nalice,alice@x.com\nno-delimiter-here\nbob,bob@x.com\n";
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, input);

        assert_eq!(report.success_count(), 1);
        // The offending row is neither a success nor a recorded failure.
        assert_eq!(report.failure_count(), 0);
        assert_eq!(
            report.aborted.as_deref(),
            Some("No separation character found. Please check your CSV-file.")
        );
        // bob was never reached.
        assert!(!store.username_exists("bob").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_header_with_single_cell_halts_immediately() {
        let input = "name;mail\nalice;alice@x.com\n";
        let mut store = MemoryStore::new();
        // Comma config against a semicolon file.
        let report = run(config(), &mut store, input);
        assert!(report.aborted.is_some());
        assert_eq!(report.success_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, "");
        assert!(report.is_empty());
        assert!(report.aborted.is_none());
    }

    #[test]
    fn test_header_only_creates_nothing() {
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, "name,mail,pass\n");
        assert!(report.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_preexisting_account_forces_suffix() {
        let mut store = MemoryStore::new();
        store.seed("alice", "old@x.com");

        let report = run(config(), &mut store, "name,mail\nAlice,new@x.com\n");
        assert_eq!(report.success_count(), 1);
        let record = report.created.values().next().unwrap();
        assert_eq!(record.name, "alice1");
    }

    #[test]
    fn test_welcome_notification_sent_per_created_account() {
        let config = ImportConfig::builder()
            .notification(NotificationPolicy::Welcome)
            .build()
            .unwrap();
        let mut store = MemoryStore::new();
        let mut notifier = LogNotifier::new();
        let report = Importer::new(config, &mut store, &mut notifier)
            .run_bytes(b"name,mail\nalice,alice@x.com\nbob,bob@x.com\n")
            .unwrap();

        assert_eq!(report.success_count(), 2);
        let ids: Vec<AccountId> = report.created.keys().copied().collect();
        assert_eq!(notifier.sent, ids);
    }

    #[test]
    fn test_no_notification_by_default() {
        let mut store = MemoryStore::new();
        let mut notifier = LogNotifier::new();
        let report = Importer::new(config(), &mut store, &mut notifier)
            .run_bytes(b"name,mail\nalice,alice@x.com\n")
            .unwrap();
        assert_eq!(report.success_count(), 1);
        assert!(notifier.sent.is_empty());
    }

    #[test]
    fn test_empty_mail_cell_is_row_local_failure() {
        let input = "name,mail\nalice,\nbob,bob@x.com\n";
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, input);

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].row, 0);
    }

    /// Store whose create fails for one specific email address.
    struct FlakyStore {
        inner: MemoryStore,
        poison_mail: String,
    }

    impl AccountStore for FlakyStore {
        fn username_exists(&self, handle: &str) -> StoreResult<bool> {
            self.inner.username_exists(handle)
        }

        fn find_by_mail(&self, mail: &str) -> StoreResult<Option<AccountId>> {
            self.inner.find_by_mail(mail)
        }

        fn create(&mut self, record: &NormalizedRecord) -> StoreResult<AccountId> {
            if record.mail == self.poison_mail {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.create(record)
        }
    }

    #[test]
    fn test_storage_failure_is_isolated_per_row() {
        let input = "name,mail\nalice,alice@x.com\nbob,bob@x.com\ncarol,carol@x.com\n";
        let mut store = FlakyStore {
            inner: MemoryStore::new(),
            poison_mail: "bob@x.com".to_string(),
        };
        let mut notifier = LogNotifier::new();
        let report = Importer::new(config(), &mut store, &mut notifier)
            .run_bytes(input.as_bytes())
            .unwrap();

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        let failure = &report.failures[0];
        assert!(failure.message.contains("bob"));
        assert!(failure.message.contains("disk full"));
        assert!(store.inner.username_exists("carol").unwrap());
    }

    #[test]
    fn test_report_keys_match_persisted_accounts() {
        let input = "name,mail\nalice,alice@x.com\nbob,bob@x.com\n";
        let mut store = MemoryStore::new();
        let report = run(config(), &mut store, input);

        for (id, record) in &report.created {
            let persisted = store.get(*id).expect("account persisted");
            assert_eq!(persisted.name, record.name);
        }
    }

    #[test]
    fn test_selected_field_absent_from_header_is_skipped() {
        let config = ImportConfig::builder().fields(["pass", "shoe_size"]).build().unwrap();
        let mut store = MemoryStore::new();
        let report = run(config, &mut store, "name,mail\nalice,alice@x.com\n");

        assert_eq!(report.success_count(), 1);
        let record = report.created.values().next().unwrap();
        assert!(record.extra.is_empty());
    }
}
