//! Import run configuration.
//!
//! An [`ImportConfig`] captures everything an import run needs besides the
//! file itself: separator character, default password, account status,
//! role set, notification policy, the selected columns, and the timezone
//! stamped onto created accounts. It is built once per invocation through
//! [`ImportConfig::builder`], validated up front, and read-only afterwards.
//!
//! Two selections are enforced regardless of what the caller picks:
//! the "name" and "mail" columns are always imported, and the
//! "authenticated" role is always assigned.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, ParseError};

/// Role every created account carries, independent of selection.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// Column holding the account handle seed. Always imported.
pub const NAME_FIELD: &str = "name";

/// Column holding the email address. Always imported.
pub const MAIL_FIELD: &str = "mail";

/// Column holding an optional per-row password override.
pub const PASS_FIELD: &str = "pass";

// =============================================================================
// Account Status
// =============================================================================

/// Status assigned to every created account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can log in.
    Active,
    /// Account is created disabled.
    Blocked,
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Active
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Blocked => write!(f, "blocked"),
        }
    }
}

// =============================================================================
// Notification Policy
// =============================================================================

/// Which registration email, if any, is sent to each created account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPolicy {
    /// Do not send a registration email.
    None,
    /// Send a welcome email for accounts created by an administrator.
    Welcome,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        NotificationPolicy::None
    }
}

// =============================================================================
// Import Configuration
// =============================================================================

/// Validated, immutable per-run settings.
///
/// Construct via [`ImportConfig::builder`]; direct construction is kept
/// private so every instance has passed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Cell separator. A single ASCII character.
    pub separator: char,
    /// Fallback password for rows without a populated "pass" cell.
    pub password: String,
    /// Status assigned to every created account.
    #[serde(default)]
    pub status: AccountStatus,
    /// Roles assigned to every created account. Always contains
    /// [`AUTHENTICATED_ROLE`]; order preserved, no duplicates.
    pub roles: Vec<String>,
    /// Registration email policy.
    #[serde(default)]
    pub notification: NotificationPolicy,
    /// Columns to import, in selection order. Always contains
    /// [`NAME_FIELD`] and [`MAIL_FIELD`]; no duplicates.
    pub fields: Vec<String>,
    /// Timezone stamped onto created accounts.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl ImportConfig {
    /// Start building a configuration with the form's defaults:
    /// `,` separator, `"change me"` password, active status, no email.
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::new()
    }

    /// The separator as the delimiter byte handed to the CSV reader.
    pub fn separator_byte(&self) -> u8 {
        self.separator as u8
    }

    /// Load a previously saved configuration from a JSON file.
    ///
    /// The loaded values go back through the builder so a hand-edited
    /// file cannot bypass validation.
    pub fn load(path: impl AsRef<Path>) -> crate::error::ImportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(ParseError::Io)?;
        let raw: ImportConfig = serde_json::from_str(&content)
            .map_err(|e| ParseError::Decode(format!("invalid configuration file: {e}")))?;
        Ok(ImportConfigBuilder::from_config(raw).build()?)
    }

    /// Save this configuration as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder collecting the raw selection before validation.
///
/// Validation checks the selection as given ("no role selected",
/// "no field selected"); the mandatory role and columns are inserted only
/// after those checks pass.
#[derive(Debug, Clone)]
pub struct ImportConfigBuilder {
    separator: char,
    password: String,
    status: AccountStatus,
    roles: Vec<String>,
    notification: NotificationPolicy,
    fields: Vec<String>,
    timezone: String,
}

impl ImportConfigBuilder {
    fn new() -> Self {
        Self {
            separator: ',',
            password: "change me".to_string(),
            status: AccountStatus::default(),
            roles: vec![AUTHENTICATED_ROLE.to_string()],
            notification: NotificationPolicy::default(),
            fields: vec![NAME_FIELD.to_string(), MAIL_FIELD.to_string()],
            timezone: default_timezone(),
        }
    }

    fn from_config(config: ImportConfig) -> Self {
        Self {
            separator: config.separator,
            password: config.password,
            status: config.status,
            roles: config.roles,
            notification: config.notification,
            fields: config.fields,
            timezone: config.timezone,
        }
    }

    /// Set the separator character.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the default password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the status for created accounts.
    pub fn status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the role selection.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the registration email policy.
    pub fn notification(mut self, policy: NotificationPolicy) -> Self {
        self.notification = policy;
        self
    }

    /// Replace the field selection.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the timezone stamped onto created accounts.
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Validate and produce the immutable configuration.
    pub fn build(self) -> ConfigResult<ImportConfig> {
        if self.roles.iter().all(|r| r.trim().is_empty()) {
            return Err(ConfigError::NoRoleSelected);
        }
        if self.fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ConfigError::NoFieldSelected);
        }
        if !self.separator.is_ascii() {
            return Err(ConfigError::InvalidSeparator(self.separator));
        }
        if self.password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }

        let roles = with_mandatory(self.roles, &[AUTHENTICATED_ROLE]);
        let fields = with_mandatory(self.fields, &[NAME_FIELD, MAIL_FIELD]);

        Ok(ImportConfig {
            separator: self.separator,
            password: self.password,
            status: self.status,
            roles,
            notification: self.notification,
            fields,
            timezone: self.timezone,
        })
    }
}

impl Default for ImportConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicate a selection preserving order, prepending any missing
/// mandatory entries.
fn with_mandatory(selected: Vec<String>, mandatory: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(selected.len() + mandatory.len());
    for m in mandatory {
        if !selected.iter().any(|s| s == m) {
            out.push((*m).to_string());
        }
    }
    for s in selected {
        if !s.trim().is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::builder().build().unwrap();
        assert_eq!(config.separator, ',');
        assert_eq!(config.password, "change me");
        assert_eq!(config.status, AccountStatus::Active);
        assert_eq!(config.notification, NotificationPolicy::None);
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.fields, vec!["name", "mail"]);
        assert_eq!(config.roles, vec!["authenticated"]);
    }

    #[test]
    fn test_mandatory_fields_always_included() {
        let config = ImportConfig::builder()
            .fields(["pass", "timezone"])
            .build()
            .unwrap();
        assert_eq!(config.fields, vec!["name", "mail", "pass", "timezone"]);
    }

    #[test]
    fn test_authenticated_role_always_included() {
        let config = ImportConfig::builder()
            .roles(["editor", "manager"])
            .build()
            .unwrap();
        assert!(config.roles.iter().any(|r| r == AUTHENTICATED_ROLE));
        assert_eq!(config.roles, vec!["authenticated", "editor", "manager"]);
    }

    #[test]
    fn test_duplicate_selection_deduplicated() {
        let config = ImportConfig::builder()
            .fields(["name", "mail", "name", "pass", "pass"])
            .build()
            .unwrap();
        assert_eq!(config.fields, vec!["name", "mail", "pass"]);
    }

    #[test]
    fn test_no_role_selected() {
        let err = ImportConfig::builder()
            .roles(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoRoleSelected);
    }

    #[test]
    fn test_no_field_selected() {
        let err = ImportConfig::builder()
            .fields(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoFieldSelected);
    }

    #[test]
    fn test_non_ascii_separator_rejected() {
        let err = ImportConfig::builder().separator('§').build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidSeparator('§'));
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = ImportConfig::builder().password("").build().unwrap_err();
        assert_eq!(err, ConfigError::EmptyPassword);
    }

    #[test]
    fn test_separator_byte() {
        let config = ImportConfig::builder().separator(';').build().unwrap();
        assert_eq!(config.separator_byte(), b';');
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("importconfig.json");

        let config = ImportConfig::builder()
            .separator(';')
            .password("s3cret")
            .status(AccountStatus::Blocked)
            .roles(["editor"])
            .notification(NotificationPolicy::Welcome)
            .fields(["pass"])
            .build()
            .unwrap();
        config.save(&path).unwrap();

        let loaded = ImportConfig::load(&path).unwrap();
        assert_eq!(loaded.separator, ';');
        assert_eq!(loaded.password, "s3cret");
        assert_eq!(loaded.status, AccountStatus::Blocked);
        assert_eq!(loaded.notification, NotificationPolicy::Welcome);
        assert_eq!(loaded.fields, vec!["name", "mail", "pass"]);
    }
}
