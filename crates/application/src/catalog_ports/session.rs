use async_trait::async_trait;

use rolesync_core::AppResult;

use super::{GroupRepository, PrincipalRepository, PrivilegeRepository};

/// One open transaction against the catalog.
///
/// Reads see a consistent view and writes stay provisional until
/// [`CatalogSession::commit`]. Dropping a session without committing rolls it
/// back.
#[async_trait]
pub trait CatalogSession: PrincipalRepository + GroupRepository + PrivilegeRepository {
    /// Commits every statement issued in the session.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discards every statement issued in the session.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
