//! Command-line interface definitions.
//!
//! Every flag is optional on its own; [`crate::config::UpdaterConfig`] merges
//! them over the YAML config file and checks that a games file was given.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the release date updater.
///
/// # Examples
///
/// ```sh
/// # Refresh the coming-soon list in place
/// release_sync --games-file ../site/games.js
///
/// # Preview without touching the file, and keep a JSON copy
/// release_sync -g ../site/games.js --dry-run -j ./coming_soon.json
///
/// # Everything from a config file
/// release_sync --config release_sync.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JavaScript data file containing the games array
    #[arg(short, long, env = "GAMES_FILE")]
    pub games_file: Option<PathBuf>,

    /// Name of the array constant to refresh (default: comingSoonGames)
    #[arg(long)]
    pub array_name: Option<String>,

    /// Store search endpoint
    #[arg(long, env = "STEAM_SEARCH_URL")]
    pub search_url: Option<String>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also write the refreshed entries as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Fetch and classify only; do not rewrite the games file
    #[arg(long)]
    pub dry_run: bool,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
