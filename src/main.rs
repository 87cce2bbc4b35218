//! # Release Sync
//!
//! Keeps the "coming soon" section of a static game site current. For every
//! upcoming title in the site's `games.js`, it searches the Steam store,
//! reads the release date shown on the first result, normalizes it, and
//! writes it back into the file.
//!
//! ## Usage
//!
//! ```sh
//! release_sync --games-file ../site/games.js
//! ```
//!
//! ## Pipeline
//!
//! 1. **Config**: merge CLI flags over an optional YAML file
//! 2. **Fetch**: search the store for each title, one at a time
//! 3. **Classify**: fold the scraped text into a date, expected year or window
//! 4. **Output**: patch the games file in place, optionally write a JSON snapshot

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classifier;
mod cli;
mod config;
mod models;
mod outputs;
mod scrapers;
mod store;
mod updater;
mod utils;

use cli::Cli;
use config::UpdaterConfig;
use scrapers::steam::SteamSearch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("release_sync starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match UpdaterConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };
    info!(
        games_file = %config.games_file.display(),
        array = %config.array_name,
        timeout_secs = config.timeout.as_secs(),
        dry_run = config.dry_run,
        "Configuration resolved"
    );

    let source = SteamSearch::new(&config.search_url, config.timeout)?;
    let summary = updater::run(&config, &source).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        updated = summary.updated,
        failures = summary.fetch_failures,
        written = summary.written,
        "Execution complete"
    );
    Ok(())
}
