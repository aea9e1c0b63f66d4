use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::{PrincipalRecord, UserAttributes};
use tracing::debug;

use crate::PrincipalRepository;

/// Existence, attributes and lifecycle of a single user principal.
pub struct PrincipalStore<'a, R: PrincipalRepository + ?Sized> {
    repository: &'a mut R,
}

impl<'a, R: PrincipalRepository + ?Sized> PrincipalStore<'a, R> {
    /// Creates a store over an open session.
    pub fn new(repository: &'a mut R) -> Self {
        Self { repository }
    }

    /// Returns whether the user exists.
    ///
    /// An empty name means "no user constraint" and is vacuously satisfied,
    /// so it returns `true`.
    pub async fn exists(&mut self, name: &str) -> AppResult<bool> {
        if name.trim().is_empty() {
            return Ok(true);
        }

        let name = Identifier::new(name.trim())?;
        Ok(self.repository.find_user(&name).await?.is_some())
    }

    /// Reads the user's catalog row, failing when it is missing.
    pub async fn fetch(&mut self, name: &Identifier) -> AppResult<PrincipalRecord> {
        self.repository
            .find_user(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{name}' was not found")))
    }

    /// Creates the user with all attributes in one statement.
    ///
    /// Fails before issuing anything when the password is missing or blank.
    pub async fn create(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<()> {
        attributes.require_password(name.as_str())?;

        self.repository.create_user(name, attributes).await?;
        debug!(user = %name, flags = ?attributes.flags, "created user");
        Ok(())
    }

    /// Alters an existing user and reports whether its catalog row changed.
    ///
    /// A `None` password leaves the stored password as is. Since passwords are
    /// never read back, a rotation alone is not visible in the returned flag.
    pub async fn alter(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<bool> {
        if let Some(password) = &attributes.password
            && password.is_blank()
        {
            return Err(AppError::Validation(format!(
                "password for user '{name}' must not be empty"
            )));
        }

        let nothing_to_alter = attributes.password.is_none()
            && attributes.flags.is_empty()
            && attributes.valid_until.is_none()
            && attributes.connection_limit.is_none();
        if nothing_to_alter {
            return Ok(false);
        }

        let before = self.fetch(name).await?;
        self.repository.alter_user(name, attributes).await?;
        let after = self.fetch(name).await?;

        let changed = before != after;
        debug!(user = %name, changed, "altered user");
        Ok(changed)
    }

    /// Drops the user. The caller checks existence and clears memberships first.
    pub async fn drop(&mut self, name: &Identifier) -> AppResult<()> {
        self.repository.drop_user(name).await?;
        debug!(user = %name, "dropped user");
        Ok(())
    }
}
