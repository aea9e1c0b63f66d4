//! Desired-state input record and its validated form.

use rolesync_core::{AppError, AppResult, Identifier};
use serde::{Deserialize, Deserializer};

use crate::principal::{ConnectionLimit, Password, PasswordUpdatePolicy, UserAttributes, ValidUntil};
use crate::privilege::ParsedPrivileges;
use crate::vocabulary::Vocabulary;

/// Target state for the named principal or groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// The principal exists with the requested attributes and grants.
    #[default]
    Present,
    /// The principal does not exist.
    Absent,
}

/// Desired state as submitted by the caller.
///
/// Empty strings mean "no operation" for `user` and `group`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesiredState {
    /// Present or absent.
    pub state: TargetState,
    /// User name, empty for group-only runs.
    pub user: String,
    /// Password used on create and, per policy, on alter.
    pub password: Option<Password>,
    /// Password rotation policy for existing users.
    pub update_password: PasswordUpdatePolicy,
    /// Group name or list of group names.
    #[serde(deserialize_with = "deserialize_groups")]
    pub group: Vec<String>,
    /// Capability flag tokens.
    pub permission_flags: Vec<String>,
    /// Privilege specs, see [`ParsedPrivileges`].
    pub privs: Vec<String>,
    /// Password expiry.
    pub expires: Option<ValidUntil>,
    /// Connection limit.
    pub conn_limit: Option<ConnectionLimit>,
    /// Roll back instead of committing.
    pub dry_run: bool,
}

impl DesiredState {
    /// Validates every input field before any statement is issued.
    pub fn resolve(&self, vocabulary: &Vocabulary) -> AppResult<ResolvedState> {
        let user = optional_identifier(self.user.as_str())?;

        let mut groups: Vec<Identifier> = Vec::new();
        for raw in &self.group {
            let Some(group) = optional_identifier(raw)? else {
                continue;
            };
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        let flags = vocabulary.normalize_flags(self.permission_flags.as_slice())?;
        let privileges = ParsedPrivileges::parse(self.privs.as_slice(), vocabulary)?;

        if !privileges.is_empty() && user.is_none() && groups.is_empty() {
            return Err(AppError::Validation(
                "privilege specs require a user or group to grant to".to_owned(),
            ));
        }

        Ok(ResolvedState {
            state: self.state,
            user,
            groups,
            update_password: self.update_password,
            attributes: UserAttributes {
                password: self.password.clone(),
                flags,
                valid_until: self.expires,
                connection_limit: self.conn_limit,
            },
            privileges,
            dry_run: self.dry_run,
        })
    }
}

/// Desired state after identifier, flag and privilege validation.
#[derive(Debug, Clone)]
pub struct ResolvedState {
    /// Present or absent.
    pub state: TargetState,
    /// Target user, if any.
    pub user: Option<Identifier>,
    /// Distinct target groups in submission order.
    pub groups: Vec<Identifier>,
    /// Password rotation policy.
    pub update_password: PasswordUpdatePolicy,
    /// Attributes for create/alter.
    pub attributes: UserAttributes,
    /// Parsed privilege grants.
    pub privileges: ParsedPrivileges,
    /// Roll back instead of committing.
    pub dry_run: bool,
}

fn optional_identifier(value: &str) -> AppResult<Option<Identifier>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Identifier::new(trimmed).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_groups<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(group)) => vec![group],
        Some(OneOrMany::Many(groups)) => groups,
    })
}
