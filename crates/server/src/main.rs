//! pricescout HTTP server entry point.
//!
//! Serves the search page and CSV export. Logs are JSON on stderr.

use anyhow::{Context, Result};
use pricescout_core::{AppConfig, telemetry};

mod error;
mod handler;
mod params;
mod view;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let _guard = telemetry::init(telemetry::LogFormat::Json, "info", config.log_file.as_deref());

    let search = pricescout_client::build_search(&config)
        .await
        .context("failed to build search service")?;
    let app = handler::router(handler::AppState::new(search));

    tracing::info!("Starting pricescout server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
