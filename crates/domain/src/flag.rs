use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolesync_core::AppError;
use serde::{Deserialize, Serialize};

/// Capability flags a Redshift user can carry, in canonical form.
///
/// `SUPERUSER` and `NOSUPERUSER` are accepted as input tokens but never appear
/// here: the vocabulary maps them onto `CREATEUSER` / `NOCREATEUSER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityFlag {
    /// Allows the user to create other users (superuser in Redshift).
    CreateUser,
    /// Removes the ability to create other users.
    NoCreateUser,
    /// Allows the user to create databases.
    CreateDb,
    /// Removes the ability to create databases.
    NoCreateDb,
}

impl CapabilityFlag {
    /// Returns the keyword emitted in `CREATE USER` / `ALTER USER`.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::CreateUser => "CREATEUSER",
            Self::NoCreateUser => "NOCREATEUSER",
            Self::CreateDb => "CREATEDB",
            Self::NoCreateDb => "NOCREATEDB",
        }
    }

    /// Returns the flag that cancels this one.
    #[must_use]
    pub fn negation(&self) -> Self {
        match self {
            Self::CreateUser => Self::NoCreateUser,
            Self::NoCreateUser => Self::CreateUser,
            Self::CreateDb => Self::NoCreateDb,
            Self::NoCreateDb => Self::CreateDb,
        }
    }

    /// Returns all canonical flags.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CapabilityFlag] = &[
            CapabilityFlag::CreateUser,
            CapabilityFlag::NoCreateUser,
            CapabilityFlag::CreateDb,
            CapabilityFlag::NoCreateDb,
        ];

        ALL
    }
}

impl FromStr for CapabilityFlag {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|flag| flag.as_sql() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability flag '{value}'")))
    }
}

impl Display for CapabilityFlag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::CapabilityFlag;

    #[test]
    fn flag_roundtrips_through_sql_keyword() {
        for flag in CapabilityFlag::all() {
            let restored = CapabilityFlag::from_str(flag.as_sql());
            assert_eq!(restored.unwrap_or(CapabilityFlag::NoCreateDb), *flag);
        }
    }

    #[test]
    fn superuser_is_not_a_canonical_flag() {
        assert!(CapabilityFlag::from_str("SUPERUSER").is_err());
    }

    #[test]
    fn negation_is_involutive() {
        for flag in CapabilityFlag::all() {
            assert_eq!(flag.negation().negation(), *flag);
        }
    }
}
