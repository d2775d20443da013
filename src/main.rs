use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use koperasi_ledger::api;
use koperasi_ledger::application::LedgerService;
use koperasi_ledger::config::{CliArgs, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let service = LedgerService::init_with_timeouts(
        &config.database.path,
        config.database.busy_timeout(),
        config.database.acquire_timeout(),
    )
    .await
    .with_context(|| format!("Failed to open ledger database at {}", config.database.path))?;

    let app = api::router(Arc::new(service));
    let addr = config.listen_addr().context("Invalid listen address")?;

    tracing::info!(%addr, database = %config.database.path, "ledger API listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
