//! # ScaffoldPro Web Service
//!
//! Serves the scaffold calculator and the pre-launch waitlist over HTTP.
//! See [`config`] for the settings it reads at startup.

mod api;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scaffold_core::catalog::ComponentCatalog;
use scaffold_core::errors::CalcError;
use scaffold_core::waitlist::{FileWaitlist, MemoryWaitlist, WaitlistStore};

use crate::api::AppState;
use crate::config::{ConfigError, ServerConfig};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CalcError),

    #[error("cannot serve on {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "service stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
    tracing::info!("Starting ScaffoldPro service");

    let catalog = match &config.catalog_path {
        Some(path) => ComponentCatalog::load(path)?,
        None => ComponentCatalog::builtin()?.clone(),
    };

    let waitlist: Arc<dyn WaitlistStore> = match &config.waitlist_path {
        Some(path) => Arc::new(FileWaitlist::open(path)?),
        None => {
            tracing::warn!("No waitlist path configured; signups are kept in memory only");
            Arc::new(MemoryWaitlist::new())
        }
    };

    let app = api::create_router(AppState {
        catalog: Arc::new(catalog),
        waitlist,
        sizing: config.sizing,
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Io {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/catalog");
    tracing::info!("  POST /api/calculate");
    tracing::info!("  POST /api/report");
    tracing::info!("  POST /api/waitlist");
    tracing::info!("  GET  /api/waitlist");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| StartupError::Io { addr, source })?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
