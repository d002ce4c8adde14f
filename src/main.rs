//! Mastermind - game server CLI

#![warn(missing_docs)]

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use mastermind::{GameEngine, Settings, router};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,mastermind=debug")),
        )
        .init();

    match cli.command {
        Command::Serve { config, host, port } => run_server(&config, host, port).await,
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    let settings = Settings::from_file(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Run the HTTP game server
#[instrument(skip(host, port))]
async fn run_server(config: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut settings = load_settings(config)?;
    if let Some(host) = host {
        settings = settings.clone().with_server(settings.server().clone().with_host(host));
    }
    if let Some(port) = port {
        settings = settings.clone().with_server(settings.server().clone().with_port(port));
    }

    let engine = Arc::new(GameEngine::from_settings(&settings)?);
    let app = router(engine);

    let server = settings.server();
    let listener = tokio::net::TcpListener::bind((server.host().as_str(), *server.port())).await?;
    info!(addr = %listener.local_addr()?, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Validate settings and print them
fn check_config(config: &Path) -> Result<()> {
    let settings = load_settings(config)?;
    println!("{}", settings.to_toml_string()?);
    Ok(())
}
