//! rolesync command-line runtime.

#![forbid(unsafe_code)]

mod cli_config;

use std::process::ExitCode;
use std::sync::Arc;

use rolesync_application::ReconcileService;
use rolesync_core::{AppError, AppResult};
use rolesync_domain::{DesiredState, ReconcileOutcome, Vocabulary};
use rolesync_infrastructure::PostgresCatalogSession;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

use crate::cli_config::{CliConfig, InputSource, init_tracing};

#[derive(Debug, Serialize)]
struct FailureDocument<'a> {
    failed: bool,
    kind: &'static str,
    msg: &'a str,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(document) => {
                println!("{document}");
                ExitCode::SUCCESS
            }
            Err(serialize_error) => report_failure(&AppError::Internal(format!(
                "failed to serialize result document: {serialize_error}"
            ))),
        },
        Err(run_error) => report_failure(&run_error),
    }
}

async fn run() -> AppResult<ReconcileOutcome> {
    let config = CliConfig::load()?;
    let desired = read_desired_state(&config.input).await?;

    info!(
        user = %desired.user,
        groups = ?desired.group,
        dry_run = desired.dry_run,
        connection = ?config.connection,
        "rolesync started"
    );

    let pool = config.connection.connect().await?;
    let session = PostgresCatalogSession::begin(&pool).await?;
    let service = ReconcileService::new(Arc::new(Vocabulary::redshift()));

    let outcome = service.reconcile(Box::new(session), &desired).await;
    pool.close().await;

    outcome
}

async fn read_desired_state(input: &InputSource) -> AppResult<DesiredState> {
    let document = match input {
        InputSource::Stdin => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map_err(|error| input_read_error("stdin", &error))?;
            buffer
        }
        InputSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|error| input_read_error(format!("'{}'", path.display()).as_str(), &error))?,
    };

    parse_desired_state(document.as_str())
}

fn input_read_error(source: &str, error: &std::io::Error) -> AppError {
    AppError::Validation(format!("failed to read desired state from {source}: {error}"))
}

fn parse_desired_state(document: &str) -> AppResult<DesiredState> {
    serde_json::from_str(document)
        .map_err(|error| AppError::Validation(format!("invalid desired state document: {error}")))
}

fn failure_document(app_error: &AppError) -> AppResult<String> {
    let message = app_error.to_string();
    serde_json::to_string(&FailureDocument {
        failed: true,
        kind: app_error.kind(),
        msg: message.as_str(),
    })
    .map_err(|error| AppError::Internal(format!("failed to serialize failure document: {error}")))
}

fn report_failure(app_error: &AppError) -> ExitCode {
    error!(kind = app_error.kind(), error = %app_error, "reconciliation failed");

    match failure_document(app_error) {
        Ok(document) => println!("{document}"),
        Err(serialize_error) => error!(error = %serialize_error, "failed to report failure"),
    }

    ExitCode::FAILURE
}
