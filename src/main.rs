//! ttt_server - UDP tic-tac-toe game server

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ttt_server::{Cli, Server, ServerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli)?;

    initialize_tracing(config.log_file().as_deref())?;

    info!(
        addr = %config.bind_addr(),
        max_sessions = config.max_sessions(),
        render = %config.render(),
        discovery = config.discovery().enabled(),
        "Starting tic-tac-toe server"
    );

    let server = Server::bind(&config).await?;
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Unable to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl-C, shutting down");
        })
        .await
}

#[instrument]
fn initialize_tracing(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Unable to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ttt_server=debug".into()),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    info!("Tracing initialized");
    Ok(())
}
