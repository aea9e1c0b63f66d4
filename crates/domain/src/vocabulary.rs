//! Closed vocabularies for capability flags and privilege keywords.
//!
//! A [`Vocabulary`] is built once at process start and handed to the
//! services by reference; nothing in it changes during a reconciliation.

use std::collections::{BTreeMap, BTreeSet};

use rolesync_core::{AppError, AppResult};

use crate::flag::CapabilityFlag;
use crate::privilege::PrivilegeList;

/// Object level a privilege list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeScope {
    /// `GRANT ... ON SCHEMA`.
    Schema,
    /// `GRANT ... ON TABLE` or `ON ALL TABLES IN SCHEMA`.
    Table,
}

impl PrivilegeScope {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Table => "table",
        }
    }
}

/// Accepted flag tokens, flag aliases and privilege keywords.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    flag_tokens: BTreeMap<&'static str, CapabilityFlag>,
    schema_privileges: BTreeSet<&'static str>,
    table_privileges: BTreeSet<&'static str>,
}

impl Vocabulary {
    /// Returns the Redshift vocabulary.
    #[must_use]
    pub fn redshift() -> Self {
        let flag_aliases = [
            ("SUPERUSER", CapabilityFlag::CreateUser),
            ("NOSUPERUSER", CapabilityFlag::NoCreateUser),
        ];

        let mut flag_tokens = CapabilityFlag::all()
            .iter()
            .map(|flag| (flag.as_sql(), *flag))
            .collect::<BTreeMap<_, _>>();
        flag_tokens.extend(flag_aliases);

        Self {
            flag_tokens,
            schema_privileges: BTreeSet::from(["CREATE", "USAGE", "ALL"]),
            table_privileges: BTreeSet::from([
                "SELECT",
                "INSERT",
                "UPDATE",
                "DELETE",
                "REFERENCES",
                "ALL",
            ]),
        }
    }

    /// Validates submitted flag tokens and maps them to canonical flags.
    ///
    /// The whole set is checked before anything is mapped, so an unknown token
    /// rejects the submission as a unit. Duplicates collapse to their first
    /// occurrence; a flag together with its negation is rejected.
    pub fn normalize_flags<S: AsRef<str>>(&self, tokens: &[S]) -> AppResult<Vec<CapabilityFlag>> {
        let invalid = tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|token| !self.flag_tokens.contains_key(token))
            .collect::<Vec<_>>();

        if !invalid.is_empty() {
            return Err(AppError::Validation(format!(
                "permission flags {invalid:?} are invalid for a user"
            )));
        }

        let mut flags = Vec::with_capacity(tokens.len());
        for token in tokens {
            let Some(flag) = self.flag_tokens.get(token.as_ref()).copied() else {
                continue;
            };

            if flags.contains(&flag.negation()) {
                return Err(AppError::Validation(format!(
                    "permission flags {flag} and {} conflict",
                    flag.negation()
                )));
            }

            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }

        Ok(flags)
    }

    /// Validates a comma-separated privilege list for the given scope.
    ///
    /// Returns `None` for an empty list.
    pub fn privilege_list(
        &self,
        scope: PrivilegeScope,
        raw: &str,
    ) -> AppResult<Option<PrivilegeList>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let allowed = match scope {
            PrivilegeScope::Schema => &self.schema_privileges,
            PrivilegeScope::Table => &self.table_privileges,
        };

        let mut keywords = Vec::new();
        for token in raw.split(',') {
            let keyword = token.trim().to_ascii_uppercase();
            if !allowed.contains(keyword.as_str()) {
                return Err(AppError::Validation(format!(
                    "invalid privilege spec: '{}' is not a {} privilege",
                    token.trim(),
                    scope.as_str()
                )));
            }

            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Ok(Some(PrivilegeList::from_keywords(keywords)))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::redshift()
    }
}
