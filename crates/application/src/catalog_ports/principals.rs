use async_trait::async_trait;

use rolesync_core::{AppResult, Identifier};
use rolesync_domain::{PrincipalRecord, UserAttributes};

/// Repository port for user principals.
///
/// Every method runs inside the session's open transaction.
#[async_trait]
pub trait PrincipalRepository: Send {
    /// Reads the catalog row for a user.
    async fn find_user(&mut self, name: &Identifier) -> AppResult<Option<PrincipalRecord>>;

    /// Issues `CREATE USER` with every supplied attribute.
    async fn create_user(&mut self, name: &Identifier, attributes: &UserAttributes)
    -> AppResult<()>;

    /// Issues `ALTER USER` with every supplied attribute.
    async fn alter_user(&mut self, name: &Identifier, attributes: &UserAttributes) -> AppResult<()>;

    /// Issues `DROP USER`.
    async fn drop_user(&mut self, name: &Identifier) -> AppResult<()>;
}
