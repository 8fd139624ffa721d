//! Row normalization: raw cells into account values.
//!
//! One [`NormalizedRecord`] is produced per accepted data row. Mapped
//! cells pass through verbatim; status, roles, and the creation time come
//! from the run configuration, never from row data. The password column
//! gets special treatment: an empty or unmapped cell falls back to the
//! configured default, so individual rows may override the password.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AccountStatus, ImportConfig, MAIL_FIELD, NAME_FIELD, PASS_FIELD};
use crate::import::header::HeaderMap;
use crate::reader::RawRow;

/// Column that may override the configured timezone per row.
const TIMEZONE_FIELD: &str = "timezone";

/// Account values for one row, ready for username resolution and
/// persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// Account handle. Holds the raw name cell until the username
    /// resolver replaces it with the unique handle.
    pub name: String,
    /// Email address, verbatim from the mapped cell.
    pub mail: String,
    /// Password: the row's cell if populated, the configured default
    /// otherwise.
    pub pass: String,
    /// From configuration.
    pub status: AccountStatus,
    /// From configuration. Always includes the authenticated role.
    pub roles: Vec<String>,
    /// Configured timezone, unless the row carries a "timezone" column.
    pub timezone: String,
    /// Run creation time, one timestamp for the whole batch.
    pub created: DateTime<Utc>,
    /// Remaining selected columns, verbatim.
    pub extra: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// A minimal record for seeding stores in tests and dry runs.
    pub fn seeded(name: &str, mail: &str) -> Self {
        Self {
            name: name.to_string(),
            mail: mail.to_string(),
            pass: String::new(),
            status: AccountStatus::Active,
            roles: vec![crate::config::AUTHENTICATED_ROLE.to_string()],
            timezone: "UTC".to_string(),
            created: Utc::now(),
            extra: BTreeMap::new(),
        }
    }
}

/// Outcome of normalizing a single raw row.
#[derive(Debug)]
pub enum Normalized {
    /// Row is ready for the rest of the pipeline.
    Record(NormalizedRecord),
    /// Row-local rejection; the batch continues.
    Reject { reason: String },
    /// The row has at most one cell: the separator is wrong for this
    /// file and the whole batch must halt.
    Fatal,
}

/// Normalize one data row against the resolved header positions.
///
/// `created` is computed once per run so every account in a batch shares
/// the same creation time.
pub fn normalize_row(
    row: &RawRow,
    headers: &HeaderMap,
    config: &ImportConfig,
    created: DateTime<Utc>,
) -> Normalized {
    if row.len() <= 1 {
        return Normalized::Fatal;
    }

    let cell = |field: &str| -> Option<&str> {
        headers
            .get(field)
            .and_then(|&idx| row.get(idx))
            .map(String::as_str)
    };

    let name = cell(NAME_FIELD).unwrap_or("").to_string();
    if name.is_empty() {
        return Normalized::Reject {
            reason: "row has an empty or unmapped name cell".to_string(),
        };
    }

    let mail = cell(MAIL_FIELD).unwrap_or("").to_string();
    if mail.is_empty() {
        return Normalized::Reject {
            reason: format!("row for '{name}' has an empty or unmapped email cell"),
        };
    }

    // Per-row password override; empty cell falls back to the default.
    let pass = match cell(PASS_FIELD) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => config.password.clone(),
    };

    let mut timezone = config.timezone.clone();
    let mut extra = BTreeMap::new();
    for field in &config.fields {
        if field == NAME_FIELD || field == MAIL_FIELD || field == PASS_FIELD {
            continue;
        }
        let Some(value) = cell(field) else { continue };
        if field == TIMEZONE_FIELD {
            if !value.is_empty() {
                timezone = value.to_string();
            }
            continue;
        }
        extra.insert(field.clone(), value.to_string());
    }

    Normalized::Record(NormalizedRecord {
        name,
        mail,
        pass,
        status: config.status,
        roles: config.roles.clone(),
        timezone,
        created,
        extra,
    })
}
