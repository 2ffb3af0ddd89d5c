//! Filter compressor CLI (C10)
//!
//! Usage:
//!   filter-compressor [--config <path>] [--database-url <url>]

use std::path::PathBuf;
use std::process::ExitCode;

use btcapi_filter_compressor::store::Store;
use btcapi_filter_compressor::utils::{init_logging_from_config, wait_for_shutdown_signal};
use btcapi_filter_compressor::{CompressorConfig, Driver};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(about = "Batch-compresses raw address filters into chained GCS filters")]
struct Args {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Postgres connection string; overrides the config file and DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match CompressorConfig::load(args.config.as_deref(), args.database_url) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    init_logging_from_config(&config);

    let store = match connect_with_retry(&config).await {
        Ok(store) => store,
        Err(err) => {
            error!("giving up on startup: {err}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_cancel.cancel();
    });

    let driver = Driver::new(store, config);
    match driver.run(cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("filter compressor exited with fatal error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Acquire the connection pool, retrying indefinitely on failure (§7,
/// startup failure policy).
async fn connect_with_retry(config: &CompressorConfig) -> Result<Store, sqlx::Error> {
    loop {
        match Store::connect(&config.database_url).await {
            Ok(store) => {
                info!("Filter compressor module started");
                return Ok(store);
            }
            Err(err) => {
                warn!("Start filter compressor module failed: {err}");
                tokio::time::sleep(config.startup_retry_delay()).await;
            }
        }
    }
}
