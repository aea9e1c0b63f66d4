use async_trait::async_trait;

use rolesync_core::{AppResult, Identifier};
use rolesync_domain::{GrantTarget, PrivilegeList, TableTarget};

/// Repository port for schema and table grants.
#[async_trait]
pub trait PrivilegeRepository: Send {
    /// Issues `REVOKE ALL ON SCHEMA`.
    async fn revoke_all_on_schema(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()>;

    /// Issues `REVOKE ALL ON ALL TABLES IN SCHEMA`.
    async fn revoke_all_on_all_tables(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()>;

    /// Issues `GRANT ... ON SCHEMA`.
    async fn grant_on_schema(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()>;

    /// Issues `GRANT ... ON TABLE` or `ON ALL TABLES IN SCHEMA`.
    async fn grant_on_tables(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        table: &TableTarget,
        target: &GrantTarget,
    ) -> AppResult<()>;
}
