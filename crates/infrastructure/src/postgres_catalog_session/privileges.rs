use async_trait::async_trait;
use rolesync_application::PrivilegeRepository;
use rolesync_core::{AppResult, Identifier};
use rolesync_domain::{GrantTarget, PrivilegeList, TableTarget};

use super::PostgresCatalogSession;
use super::statements;

#[async_trait]
impl PrivilegeRepository for PostgresCatalogSession {
    async fn revoke_all_on_schema(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let statement = statements::revoke_all_on_schema(schema, target);
        self.execute(statement.as_str(), statement.as_str()).await
    }

    async fn revoke_all_on_all_tables(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let statement = statements::revoke_all_on_all_tables(schema, target);
        self.execute(statement.as_str(), statement.as_str()).await
    }

    async fn grant_on_schema(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let statement = statements::grant_on_schema(privileges, schema, target);
        self.execute(statement.as_str(), statement.as_str()).await
    }

    async fn grant_on_tables(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        table: &TableTarget,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let statement = statements::grant_on_tables(privileges, schema, table, target);
        self.execute(statement.as_str(), statement.as_str()).await
    }
}
