use rolesync_core::{AppResult, Identifier};
use tracing::debug;

use crate::GroupRepository;

/// Existence and lifecycle of named groups.
pub struct GroupStore<'a, R: GroupRepository + ?Sized> {
    repository: &'a mut R,
}

impl<'a, R: GroupRepository + ?Sized> GroupStore<'a, R> {
    /// Creates a store over an open session.
    pub fn new(repository: &'a mut R) -> Self {
        Self { repository }
    }

    /// Returns whether the group exists; an empty name is vacuously `true`.
    pub async fn exists(&mut self, name: &str) -> AppResult<bool> {
        if name.trim().is_empty() {
            return Ok(true);
        }

        let name = Identifier::new(name.trim())?;
        self.repository.group_exists(&name).await
    }

    /// Creates the group. Not idempotent: check [`GroupStore::exists`] first.
    pub async fn create(&mut self, name: &Identifier) -> AppResult<()> {
        self.repository.create_group(name).await?;
        debug!(group = %name, "created group");
        Ok(())
    }

    /// Drops the group. Not idempotent: check [`GroupStore::exists`] first.
    pub async fn drop(&mut self, name: &Identifier) -> AppResult<()> {
        self.repository.drop_group(name).await?;
        debug!(group = %name, "dropped group");
        Ok(())
    }
}
