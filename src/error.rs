//! Error types for the userload import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - Pre-run configuration validation errors
//! - [`ParseError`] - Input reading and decoding errors
//! - [`StoreError`] - Account store collaborator errors
//! - [`NotifyError`] - Notification collaborator errors
//! - [`ImportError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Row-local conditions (duplicate email, storage failure on create) are
//! *not* errors at this level: they are recorded in the
//! [`ImportReport`](crate::ImportReport) and never abort the batch.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors found while validating an import configuration, before any row
/// is processed. The run does not start when one of these is raised.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No role was selected for the imported users.
    #[error("Please select at least one role to apply to the imported user(s)")]
    NoRoleSelected,

    /// No field was selected to read from the file.
    #[error("Please select at least one field to apply to the imported user(s)")]
    NoFieldSelected,

    /// The separator must be a single ASCII character so the reader can
    /// use it as a delimiter byte.
    #[error("Separator character '{0}' is not a single ASCII character")]
    InvalidSeparator(char),

    /// The default password may not be empty; it is the fallback for rows
    /// without a password cell.
    #[error("Default password must not be empty")]
    EmptyPassword,
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while reading and decoding the uploaded file.
///
/// The "no separation character found" condition (a row with at most one
/// cell) is deliberately absent here: it aborts row processing but is
/// surfaced through [`ImportReport::aborted`](crate::ImportReport) so that
/// accounts created from earlier rows are preserved.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the file (includes the "no file chosen" case).
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode file content: {0}")]
    Decode(String),

    /// A data row could not be split into cells.
    #[error("Failed to parse row {row}: {message}")]
    Row { row: usize, message: String },
}

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Errors raised by the external account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend rejected the operation.
    #[error("Account store error: {0}")]
    Backend(String),

    /// The uniqueness oracle never reported a free handle within the
    /// probe bound.
    #[error("Could not find a free username for '{seed}' after {attempts} attempts")]
    UsernameExhausted { seed: String, attempts: u32 },
}

/// Errors raised by the notification channel.
///
/// Notification failures are never fatal to the import; the pipeline logs
/// them and keeps the created account.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to notify account {id}: {message}")]
    Send { id: u64, message: String },
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level pipeline errors, returned by
/// [`Importer::run`](crate::Importer::run).
///
/// Only pre-run conditions end up here; once row processing has started,
/// every outcome is reported through the [`ImportReport`](crate::ImportReport).
#[derive(Debug, Error)]
pub enum ImportError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input reading/decoding error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for input reading.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for account store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pipeline operations.
pub type ImportResult<T> = Result<T, ImportError>;
