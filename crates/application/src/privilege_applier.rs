use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::{GrantTarget, ParsedPrivileges};
use tracing::debug;

use crate::PrivilegeRepository;

/// Revokes and re-grants schema and table privileges for one grantee.
pub struct PrivilegeApplier<'a, R: PrivilegeRepository + ?Sized> {
    repository: &'a mut R,
}

impl<'a, R: PrivilegeRepository + ?Sized> PrivilegeApplier<'a, R> {
    /// Creates an applier over an open session.
    pub fn new(repository: &'a mut R) -> Self {
        Self { repository }
    }

    /// Applies privileges to the user when given, otherwise to the group.
    pub async fn apply_for(
        &mut self,
        privileges: &ParsedPrivileges,
        user: Option<&Identifier>,
        group: Option<&Identifier>,
    ) -> AppResult<bool> {
        if privileges.is_empty() {
            return Ok(false);
        }

        let Some(target) = GrantTarget::resolve(user, group) else {
            return Err(AppError::Validation(
                "privilege specs require a user or group to grant to".to_owned(),
            ));
        };

        self.apply(privileges, &target).await
    }

    /// Applies every schema entry to `target`.
    ///
    /// Each schema is first stripped of all schema and table privileges for the
    /// target, whether or not anything is granted afterwards. Returns `true`
    /// whenever at least one schema was processed.
    async fn apply(
        &mut self,
        privileges: &ParsedPrivileges,
        target: &GrantTarget,
    ) -> AppResult<bool> {
        for (schema, entry) in privileges {
            self.repository.revoke_all_on_schema(schema, target).await?;
            self.repository
                .revoke_all_on_all_tables(schema, target)
                .await?;

            if let Some(schema_privileges) = entry.privileges() {
                self.repository
                    .grant_on_schema(schema_privileges, schema, target)
                    .await?;
            }

            for (table, table_privileges) in entry.tables() {
                self.repository
                    .grant_on_tables(table_privileges, schema, table, target)
                    .await?;
            }

            debug!(schema = %schema, target = %target, "applied privileges");
        }

        Ok(!privileges.is_empty())
    }
}
