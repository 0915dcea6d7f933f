//! pricescout interactive CLI.
//!
//! Prompts for a search, prints the cheapest matches, then narrows them
//! with ban keywords until `q`. Logs go to stderr at `warn` unless
//! `RUST_LOG` says otherwise.

use anyhow::{Context, Result};
use pricescout_core::{AppConfig, telemetry};

mod session;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let _guard = telemetry::init(telemetry::LogFormat::Compact, "warn", config.log_file.as_deref());

    let search = pricescout_client::build_search(&config)
        .await
        .context("failed to build search service")?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    session::run(&search, stdin.lock(), &mut stdout)
        .await
        .context("terminal i/o failed")?;

    Ok(())
}
