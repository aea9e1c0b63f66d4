use async_trait::async_trait;
use rolesync_application::CatalogSession;
use rolesync_core::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

mod groups;
mod principals;
mod privileges;
mod statements;

/// Redshift catalog session bound to one open transaction.
///
/// Every read and write goes through the same transaction, so existence
/// checks observe statements issued earlier in the run.
pub struct PostgresCatalogSession {
    transaction: Transaction<'static, Postgres>,
}

impl PostgresCatalogSession {
    /// Opens a transaction on the pool.
    pub async fn begin(pool: &PgPool) -> AppResult<Self> {
        let transaction = pool.begin().await.map_err(|error| {
            AppError::Database(format!("failed to begin transaction: {error}"))
        })?;

        Ok(Self { transaction })
    }

    /// Runs one DDL or DCL statement over the simple query protocol, logging
    /// `logged` in place of the statement text.
    async fn execute(&mut self, statement: &str, logged: &str) -> AppResult<()> {
        debug!(statement = %logged, "executing catalog statement");

        sqlx::Executor::execute(&mut *self.transaction, sqlx::raw_sql(statement))
            .await
            .map_err(|error| AppError::Database(format!("failed to execute '{logged}': {error}")))?;

        Ok(())
    }
}

#[async_trait]
impl CatalogSession for PostgresCatalogSession {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Database(format!("failed to commit transaction: {error}"))
        })
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.transaction.rollback().await.map_err(|error| {
            AppError::Database(format!("failed to roll back transaction: {error}"))
        })
    }
}
