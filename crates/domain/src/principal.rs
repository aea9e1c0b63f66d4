//! User principal attributes and catalog projection.

use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rolesync_core::{AppError, AppResult};
use serde::Deserialize;

use crate::flag::CapabilityFlag;

/// Write-only user password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Password(String);

impl Password {
    /// Wraps a plaintext (or `md5`-prefixed) password.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret for server-side quoting.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the password is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Debug for Password {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("Password(<redacted>)")
    }
}

/// Whether an existing user's password is rotated on every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordUpdatePolicy {
    /// Rotate whenever a password is supplied.
    #[default]
    Always,
    /// Only set the password when the user is created.
    OnCreate,
}

/// Maximum concurrent connections for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConnectionLimit")]
pub enum ConnectionLimit {
    /// At most this many connections.
    Limited(u32),
    /// No limit.
    Unlimited,
}

impl ConnectionLimit {
    /// Renders the value after `CONNECTION LIMIT`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Limited(limit) => limit.to_string(),
            Self::Unlimited => "UNLIMITED".to_owned(),
        }
    }
}

impl FromStr for ConnectionLimit {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::Unlimited);
        }

        trimmed.parse::<u32>().map(Self::Limited).map_err(|error| {
            AppError::Validation(format!(
                "connection limit must be a non-negative integer or 'unlimited', \
                 got '{value}': {error}"
            ))
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConnectionLimit {
    Count(u32),
    Text(String),
}

impl TryFrom<RawConnectionLimit> for ConnectionLimit {
    type Error = AppError;

    fn try_from(value: RawConnectionLimit) -> Result<Self, Self::Error> {
        match value {
            RawConnectionLimit::Count(limit) => Ok(Self::Limited(limit)),
            RawConnectionLimit::Text(text) => Self::from_str(text.as_str()),
        }
    }
}

/// Password expiry for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ValidUntil {
    /// Password expires at this instant.
    At(DateTime<Utc>),
    /// Password never expires.
    Infinity,
}

impl ValidUntil {
    /// Renders the quoted literal after `VALID UNTIL`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::At(instant) => format!("'{}'", instant.format("%Y-%m-%d %H:%M:%S")),
            Self::Infinity => "'infinity'".to_owned(),
        }
    }
}

impl FromStr for ValidUntil {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("infinity") {
            return Ok(Self::Infinity);
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::At(instant.with_timezone(&Utc)));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self::At(naive.and_utc()));
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self::At(naive.and_utc()))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "expiry '{value}' must be RFC 3339, 'YYYY-MM-DD[ HH:MM:SS]' or 'infinity'"
                ))
            })
    }
}

impl TryFrom<String> for ValidUntil {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

/// Attribute surface shared by `CREATE USER` and `ALTER USER`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAttributes {
    /// New password; `None` leaves the stored password untouched on alter.
    pub password: Option<Password>,
    /// Canonical capability flags.
    pub flags: Vec<CapabilityFlag>,
    /// Optional password expiry.
    pub valid_until: Option<ValidUntil>,
    /// Optional connection limit.
    pub connection_limit: Option<ConnectionLimit>,
}

impl UserAttributes {
    /// Fails unless a non-blank password is present.
    pub fn require_password(&self, user: &str) -> AppResult<&Password> {
        match &self.password {
            Some(password) if !password.is_blank() => Ok(password),
            Some(_) => Err(AppError::Validation(format!(
                "password for user '{user}' must not be empty"
            ))),
            None => Err(AppError::Validation(format!(
                "password is required when creating user '{user}'"
            ))),
        }
    }
}

/// Catalog row for one user, as read back from `pg_user_info`.
///
/// The password is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    /// User name as stored.
    pub name: String,
    /// Numeric identifier assigned by the database.
    pub sysid: i64,
    /// `CREATEDB` capability.
    pub can_create_db: bool,
    /// `CREATEUSER` capability.
    pub is_superuser: bool,
    /// Whether the user may update system catalogs.
    pub can_update_catalog: bool,
    /// Stored password expiry, as text.
    pub valid_until: Option<String>,
    /// Stored connection limit, as text.
    pub connection_limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ConnectionLimit, Password, UserAttributes, ValidUntil};

    #[test]
    fn password_debug_is_redacted() {
        let password = Password::new("s3cret-Value");
        assert!(!format!("{password:?}").contains("s3cret"));
    }

    #[test]
    fn connection_limit_accepts_numbers_and_unlimited() {
        assert!(matches!(
            ConnectionLimit::from_str("25"),
            Ok(ConnectionLimit::Limited(25))
        ));
        assert!(matches!(
            ConnectionLimit::from_str("UNLIMITED"),
            Ok(ConnectionLimit::Unlimited)
        ));
        assert!(ConnectionLimit::from_str("-1").is_err());
    }

    #[test]
    fn connection_limit_deserializes_from_number_or_text() {
        let from_number: Result<ConnectionLimit, _> = serde_json::from_str("10");
        let from_text: Result<ConnectionLimit, _> = serde_json::from_str("\"unlimited\"");

        assert!(matches!(from_number, Ok(ConnectionLimit::Limited(10))));
        assert!(matches!(from_text, Ok(ConnectionLimit::Unlimited)));
    }

    #[test]
    fn valid_until_accepts_supported_formats() {
        let rfc3339 = ValidUntil::from_str("2030-01-02T03:04:05Z");
        let spaced = ValidUntil::from_str("2030-01-02 03:04:05");
        let date = ValidUntil::from_str("2030-01-02");

        assert_eq!(
            rfc3339.map(|value| value.to_sql()).unwrap_or_default(),
            "'2030-01-02 03:04:05'"
        );
        assert_eq!(
            spaced.map(|value| value.to_sql()).unwrap_or_default(),
            "'2030-01-02 03:04:05'"
        );
        assert_eq!(
            date.map(|value| value.to_sql()).unwrap_or_default(),
            "'2030-01-02 00:00:00'"
        );
        assert!(matches!(
            ValidUntil::from_str("Infinity"),
            Ok(ValidUntil::Infinity)
        ));
        assert!(ValidUntil::from_str("next tuesday").is_err());
    }

    #[test]
    fn create_requires_non_blank_password() {
        let missing = UserAttributes::default();
        let blank = UserAttributes {
            password: Some(Password::new("  ")),
            ..UserAttributes::default()
        };

        assert!(missing.require_password("bob").is_err());
        assert!(blank.require_password("bob").is_err());
    }
}
