use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;

use catalog::infra::storage::migrations::Migrator;

mod config;
mod logging;

use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Bookstore catalog server
#[derive(Parser)]
#[command(name = "bookstore-server")]
#[command(about = "Bookstore catalog service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init(&config.logging);
    tracing::info!("Bookstore server starting");

    let mut opts = ConnectOptions::new(config.database.url.clone());
    if let Some(max) = config.database.max_conns {
        opts.max_connections(max);
    }
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database: {}", config.database.url))?;

    Migrator::up(&db, None)
        .await
        .context("Failed to apply database migrations")?;

    let app = catalog::build_router(db);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Bookstore server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
}
