use async_trait::async_trait;
use rolesync_application::PrincipalRepository;
use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::{PrincipalRecord, UserAttributes};
use sqlx::FromRow;

use super::PostgresCatalogSession;
use super::statements::{self, REDACTED_LITERAL};

#[derive(Debug, FromRow)]
struct PrincipalRow {
    name: String,
    sysid: i64,
    usecreatedb: bool,
    usesuper: bool,
    usecatupd: bool,
    valid_until: Option<String>,
    connection_limit: Option<String>,
}

impl From<PrincipalRow> for PrincipalRecord {
    fn from(row: PrincipalRow) -> Self {
        Self {
            name: row.name,
            sysid: row.sysid,
            can_create_db: row.usecreatedb,
            is_superuser: row.usesuper,
            can_update_catalog: row.usecatupd,
            valid_until: row.valid_until,
            connection_limit: row.connection_limit,
        }
    }
}

impl PostgresCatalogSession {
    async fn quote_password(&mut self, password: &str) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT quote_literal($1)")
            .bind(password)
            .fetch_one(&mut *self.transaction)
            .await
            .map_err(|error| AppError::Database(format!("failed to quote password: {error}")))
    }
}

#[async_trait]
impl PrincipalRepository for PostgresCatalogSession {
    async fn find_user(&mut self, name: &Identifier) -> AppResult<Option<PrincipalRecord>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT
                usename::text AS name,
                usesysid::bigint AS sysid,
                usecreatedb,
                usesuper,
                usecatupd,
                valuntil::text AS valid_until,
                useconnlimit::text AS connection_limit
            FROM pg_user_info
            WHERE usename = $1
            LIMIT 1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Database(format!("failed to look up user '{name}': {error}")))?;

        Ok(row.map(PrincipalRecord::from))
    }

    async fn create_user(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<()> {
        let password = attributes.require_password(name.as_str())?;
        let literal = self.quote_password(password.expose()).await?;

        self.execute(
            statements::create_user(name, literal.as_str(), attributes).as_str(),
            statements::create_user(name, REDACTED_LITERAL, attributes).as_str(),
        )
        .await
    }

    async fn alter_user(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<()> {
        let literal = match &attributes.password {
            Some(password) => Some(self.quote_password(password.expose()).await?),
            None => None,
        };
        let logged_literal = literal.as_ref().map(|_| REDACTED_LITERAL);

        self.execute(
            statements::alter_user(name, literal.as_deref(), attributes).as_str(),
            statements::alter_user(name, logged_literal, attributes).as_str(),
        )
        .await
    }

    async fn drop_user(&mut self, name: &Identifier) -> AppResult<()> {
        let statement = statements::drop_user(name);
        self.execute(statement.as_str(), statement.as_str()).await
    }
}
