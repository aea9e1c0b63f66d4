use std::collections::BTreeSet;

use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::MembershipDiff;
use tracing::debug;

use crate::{GroupRepository, PrincipalRepository, PrincipalStore};

/// Moves one user into exactly a desired set of groups.
pub struct MembershipResolver<'a, R: PrincipalRepository + GroupRepository + ?Sized> {
    repository: &'a mut R,
}

impl<'a, R: PrincipalRepository + GroupRepository + ?Sized> MembershipResolver<'a, R> {
    /// Creates a resolver over an open session.
    pub fn new(repository: &'a mut R) -> Self {
        Self { repository }
    }

    /// Returns the names of every group the user belongs to.
    pub async fn current_groups(&mut self, user: &Identifier) -> AppResult<BTreeSet<String>> {
        let sysid = PrincipalStore::new(&mut *self.repository)
            .fetch(user)
            .await?
            .sysid;

        Ok(self
            .repository
            .list_group_members()
            .await?
            .into_iter()
            .filter(|group| group.members.contains(&sysid))
            .map(|group| group.name)
            .collect())
    }

    /// Drops the user from groups outside `desired`, then adds it to the
    /// missing ones. An empty `desired` removes the user from every group.
    ///
    /// Returns whether any membership statement was issued.
    pub async fn reconcile(
        &mut self,
        user: &Identifier,
        desired: &[Identifier],
    ) -> AppResult<bool> {
        let current = self.current_groups(user).await?;
        let desired = desired
            .iter()
            .map(|group| group.as_str().to_owned())
            .collect::<BTreeSet<_>>();

        let diff = MembershipDiff::compute(&current, &desired);

        for group in &diff.to_drop {
            let group = stored_group_identifier(group)?;
            self.repository.drop_user_from_group(&group, user).await?;
            debug!(user = %user, group = %group, "dropped user from group");
        }

        for group in &diff.to_add {
            let group = Identifier::new(group.as_str())?;
            self.repository.add_user_to_group(&group, user).await?;
            debug!(user = %user, group = %group, "added user to group");
        }

        Ok(!diff.is_empty())
    }
}

/// Groups found in the catalog are addressed by their stored name, even when
/// it would not pass as input.
fn stored_group_identifier(name: &str) -> AppResult<Identifier> {
    Identifier::from_catalog(name).map_err(|error| {
        AppError::Validation(format!(
            "existing group '{}' cannot be addressed by name: {error}",
            name.escape_debug()
        ))
    })
}
