use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rolesync_core::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

/// Default Redshift port.
pub const DEFAULT_PORT: u16 = 5439;

/// Where and how to reach the cluster.
///
/// A `database_url` takes precedence over every discrete field.
#[derive(Clone)]
pub struct ConnectionSettings {
    /// Full connection URL, overriding the discrete fields when set.
    pub database_url: Option<String>,
    /// Cluster host name.
    pub host: String,
    /// Cluster port.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: Option<String>,
    /// Database to connect to.
    pub database: String,
    /// Require TLS when `true`, disable it otherwise.
    pub require_ssl: bool,
    /// Unix socket directory, used instead of TCP for a local host.
    pub unix_socket: Option<PathBuf>,
}

impl Debug for ConnectionSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConnectionSettings")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "<redacted>"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("require_ssl", &self.require_ssl)
            .field("unix_socket", &self.unix_socket)
            .finish()
    }
}

impl ConnectionSettings {
    /// Builds driver options from the settings.
    pub fn connect_options(&self) -> AppResult<PgConnectOptions> {
        if let Some(database_url) = &self.database_url {
            return PgConnectOptions::from_str(database_url.as_str())
                .map(|options| options.application_name("rolesync"))
                .map_err(|error| AppError::Validation(format!("invalid DATABASE_URL: {error}")));
        }

        let host = if self.host.trim().is_empty() {
            "localhost"
        } else {
            self.host.trim()
        };

        let mut options = PgConnectOptions::new()
            .host(host)
            .port(self.port)
            .username(self.user.as_str())
            .database(self.database.as_str())
            .application_name("rolesync")
            .ssl_mode(if self.require_ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            });

        if let Some(password) = self.password.as_deref().filter(|value| !value.is_empty()) {
            options = options.password(password);
        }

        if let Some(socket) = &self.unix_socket
            && host == "localhost"
        {
            options = options.socket(socket);
        }

        Ok(options)
    }

    /// Opens a single-connection pool; one run never needs more.
    pub async fn connect(&self) -> AppResult<PgPool> {
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(self.connect_options()?)
            .await
            .map_err(|error| AppError::Database(format!("failed to connect to database: {error}")))
    }
}
