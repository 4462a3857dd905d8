use std::env;
use std::process::ExitCode;

use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sheet_export::auth::broker::CredentialBroker;
use sheet_export::auth::exchange::HttpTokenExchanger;
use sheet_export::auth::prompt::StdinPrompt;
use sheet_export::auth::registration::ClientRegistration;
use sheet_export::config::app_config::AppConfig;
use sheet_export::sheets::client::HttpValuesClient;
use sheet_export::sheets::fetcher::SheetFetcher;

#[derive(Error, Debug)]
enum AppError {
    #[error("configuration error")]
    Config,
    #[error("authorization failed")]
    Auth,
    #[error("sheet export failed")]
    Export,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(count) => {
            info!("exported {count} records");
            ExitCode::SUCCESS
        }
        Err(report) => {
            error!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<usize, AppError> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "Config".to_owned());
    let config = AppConfig::load(&config_path).change_context(AppError::Config)?;

    let registration = ClientRegistration::from_file(&config.auth.credentials_path)
        .change_context(AppError::Config)?;

    let http = reqwest::Client::new();
    let broker = CredentialBroker::new(
        config.auth.token_cache_path.clone(),
        StdinPrompt,
        HttpTokenExchanger::new(http.clone()),
    )
    .refresh_expired(config.auth.refresh_expired);

    // May suspend on first run until the operator pastes the code back.
    let credential = broker
        .acquire(&registration)
        .await
        .change_context(AppError::Auth)?;

    let fetcher = SheetFetcher::new(HttpValuesClient::new(http, credential));
    let records = fetcher
        .fetch(
            &config.spreadsheet.spreadsheet_id,
            &config.spreadsheet.range,
            config.spreadsheet.output_path.as_deref(),
        )
        .await
        .change_context(AppError::Export)?;

    Ok(records.len())
}
