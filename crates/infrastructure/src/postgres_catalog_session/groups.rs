use async_trait::async_trait;
use rolesync_application::{GroupMembers, GroupRepository};
use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::parse_member_list;
use sqlx::FromRow;

use super::PostgresCatalogSession;
use super::statements::{self, MembershipChange};

#[derive(Debug, FromRow)]
struct GroupRow {
    name: String,
    members: Option<String>,
}

impl PostgresCatalogSession {
    async fn alter_group(
        &mut self,
        group: &Identifier,
        change: MembershipChange,
        user: &Identifier,
    ) -> AppResult<()> {
        let statement = statements::alter_group(group, change, user);
        self.execute(statement.as_str(), statement.as_str()).await
    }
}

#[async_trait]
impl GroupRepository for PostgresCatalogSession {
    async fn group_exists(&mut self, name: &Identifier) -> AppResult<bool> {
        let found = sqlx::query_scalar::<_, String>(
            r#"
            SELECT groname::text
            FROM pg_group
            WHERE groname = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Database(format!("failed to look up group '{name}': {error}")))?;

        Ok(found.is_some())
    }

    async fn create_group(&mut self, name: &Identifier) -> AppResult<()> {
        let statement = statements::create_group(name);
        self.execute(statement.as_str(), statement.as_str()).await
    }

    async fn drop_group(&mut self, name: &Identifier) -> AppResult<()> {
        let statement = statements::drop_group(name);
        self.execute(statement.as_str(), statement.as_str()).await
    }

    async fn list_group_members(&mut self) -> AppResult<Vec<GroupMembers>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT
                groname::text AS name,
                array_to_string(grolist, ',') AS members
            FROM pg_group
            "#,
        )
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Database(format!("failed to list group members: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(GroupMembers {
                    members: parse_member_list(row.members.as_deref())?,
                    name: row.name,
                })
            })
            .collect()
    }

    async fn add_user_to_group(&mut self, group: &Identifier, user: &Identifier) -> AppResult<()> {
        self.alter_group(group, MembershipChange::Add, user).await
    }

    async fn drop_user_from_group(
        &mut self,
        group: &Identifier,
        user: &Identifier,
    ) -> AppResult<()> {
        self.alter_group(group, MembershipChange::Drop, user).await
    }
}
