use std::env;
use std::path::PathBuf;

use rolesync_core::{AppError, AppResult};
use rolesync_infrastructure::{ConnectionSettings, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

/// Where the desired-state document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub connection: ConnectionSettings,
    pub input: InputSource,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_sources(env::args().skip(1), |name| env::var(name).ok())
    }

    fn from_sources(
        args: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let input = parse_input(args)?;
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = lookup("DATABASE_URL");
        let database = match (lookup("REDSHIFT_DATABASE"), &database_url) {
            (Some(database), _) => database,
            (None, Some(_)) => String::new(),
            (None, None) => {
                return Err(AppError::Validation(
                    "REDSHIFT_DATABASE is required when DATABASE_URL is not set".to_owned(),
                ));
            }
        };

        let port = match lookup("REDSHIFT_PORT") {
            Some(value) => value.parse::<u16>().map_err(|error| {
                AppError::Validation(format!("invalid REDSHIFT_PORT value '{value}': {error}"))
            })?,
            None => DEFAULT_PORT,
        };

        let require_ssl = match lookup("REDSHIFT_SSL") {
            Some(value) => parse_bool("REDSHIFT_SSL", value.as_str())?,
            None => true,
        };

        Ok(Self {
            connection: ConnectionSettings {
                database_url,
                host: lookup("REDSHIFT_HOST").unwrap_or_else(|| "localhost".to_owned()),
                port,
                user: lookup("REDSHIFT_USER").unwrap_or_else(|| "rs_master".to_owned()),
                password: lookup("REDSHIFT_PASSWORD"),
                database,
                require_ssl,
                unix_socket: lookup("REDSHIFT_UNIX_SOCKET").map(PathBuf::from),
            },
            input,
        })
    }
}

fn parse_input(args: impl IntoIterator<Item = String>) -> AppResult<InputSource> {
    let mut args = args.into_iter();
    let input = match args.next() {
        None => InputSource::Stdin,
        Some(path) if path == "-" => InputSource::Stdin,
        Some(path) => InputSource::File(PathBuf::from(path)),
    };

    if let Some(extra) = args.next() {
        return Err(AppError::Validation(format!(
            "unexpected argument '{extra}': expected at most one input path"
        )));
    }

    Ok(input)
}

fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid {name} value '{value}': expected true or false"
        ))),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
