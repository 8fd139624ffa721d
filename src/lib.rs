//! # userload - bulk user provisioning from delimited text files
//!
//! userload turns a delimited file of user data into persisted accounts:
//!
//! ```text
//! ┌─────────────┐    ┌───────────┐    ┌─────────────┐    ┌────────────┐
//! │  CSV file   │───▶│  Reader   │───▶│  Pipeline   │───▶│   Report   │
//! │ (any enc.)  │    │ (decode)  │    │ (per row)   │    │ (by uid)   │
//! └─────────────┘    └───────────┘    └─────────────┘    └────────────┘
//! ```
//!
//! Per data row the pipeline resolves a unique handle, guards against
//! duplicate email addresses, and persists the account through an
//! injected [`AccountStore`]. Failures are isolated per row; only a row
//! with no separator halts the batch.
//!
//! ## Quick Start
//!
//! ```rust
//! use userload::{ImportConfig, Importer, LogNotifier, MemoryStore};
//!
//! let config = ImportConfig::builder().build().unwrap();
//! let mut store = MemoryStore::new();
//! let mut notifier = LogNotifier::new();
//!
//! let report = Importer::new(config, &mut store, &mut notifier)
//!     .run_bytes(b"name,mail\nalice,alice@x.com\n")
//!     .unwrap();
//! assert_eq!(report.success_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Validated run configuration
//! - [`reader`] - Encoding detection and row reading
//! - [`import`] - Header resolution, normalization, pipeline, report
//! - [`store`] - Collaborator traits and reference implementations
//! - [`sample`] - Sample file generation

// Core modules
pub mod config;
pub mod error;

// Input
pub mod reader;

// Pipeline
pub mod import;

// Collaborators
pub mod store;

// Sample generation
pub mod sample;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConfigError, ImportError, NotifyError, ParseError, StoreError};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{
    AccountStatus, ImportConfig, ImportConfigBuilder, NotificationPolicy, AUTHENTICATED_ROLE,
    MAIL_FIELD, NAME_FIELD, PASS_FIELD,
};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{decode_content, detect_encoding, read_rows, read_rows_from_bytes, RawRow};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use import::{
    normalize_row, resolve_headers, resolve_username, HeaderMap, ImportReport, Importer,
    Normalized, NormalizedRecord, RowFailure, MAX_USERNAME_PROBES,
};

// =============================================================================
// Re-exports - Collaborators
// =============================================================================

pub use store::{AccountId, AccountStore, LogNotifier, MemoryStore, Notifier};

// =============================================================================
// Re-exports - Sample
// =============================================================================

pub use sample::{sample_csv, SAMPLE_FILE_NAME};
