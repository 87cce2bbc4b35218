//! Runtime configuration for the updater.
//!
//! Settings come from two layers, later wins:
//!
//! 1. An optional YAML file (`--config release_sync.yaml`)
//! 2. Command-line flags and their environment variables
//!
//! The merged result is an [`UpdaterConfig`] that is passed explicitly to the
//! updater; nothing reads paths from global state.
//!
//! # Example file
//!
//! ```yaml
//! games_file: ../saudideck-site/games.js
//! array_name: comingSoonGames
//! timeout_secs: 10
//! json_output: ./out/coming_soon.json
//! ```

use crate::cli::Cli;
use crate::scrapers::steam::DEFAULT_SEARCH_URL;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Name of the array literal holding upcoming games in the site's data file.
pub const DEFAULT_ARRAY_NAME: &str = "comingSoonGames";

/// Ceiling on a single search request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings as they appear in the YAML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub games_file: Option<PathBuf>,
    pub array_name: Option<String>,
    pub search_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub json_output: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

impl ConfigFile {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let parsed: ConfigFile = serde_yaml::from_str(&raw)?;
        info!("Loaded configuration file");
        Ok(parsed)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdaterConfig {
    /// The site's data file holding the games array.
    pub games_file: PathBuf,
    /// Name of the `const <name> = [...]` array to refresh.
    pub array_name: String,
    /// Store search endpoint; the title is appended as `?term=`.
    pub search_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where to write the structured JSON snapshot, if anywhere.
    pub json_output: Option<PathBuf>,
    /// Fetch and classify, but leave the games file untouched.
    pub dry_run: bool,
}

impl UpdaterConfig {
    /// Merge CLI flags over an optional config file.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or parsed, or if no games
    /// file is given by either layer.
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: ConfigFile) -> Result<Self, Box<dyn Error>> {
        let games_file = cli
            .games_file
            .clone()
            .or(file.games_file)
            .ok_or("no games file given (use --games-file, GAMES_FILE or games_file in the config)")?;

        Ok(Self {
            games_file,
            array_name: cli
                .array_name
                .clone()
                .or(file.array_name)
                .unwrap_or_else(|| DEFAULT_ARRAY_NAME.to_string()),
            search_url: cli
                .search_url
                .clone()
                .or(file.search_url)
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            json_output: cli.json_output.clone().or(file.json_output),
            dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_from_cli_only() {
        let cli = Cli::parse_from(["release_sync", "--games-file", "site/games.js"]);
        let config = UpdaterConfig::from_cli(&cli).unwrap();
        assert_eq!(config.games_file, PathBuf::from("site/games.js"));
        assert_eq!(config.array_name, DEFAULT_ARRAY_NAME);
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.json_output, None);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_missing_games_file_is_an_error() {
        let cli = Cli::parse_from(["release_sync"]);
        let err = UpdaterConfig::merge(&cli, ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("no games file"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut yaml = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            yaml,
            "games_file: from_file.js\narray_name: upcoming\ntimeout_secs: 3\ndry_run: true"
        )
        .unwrap();

        let path = yaml.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from([
            "release_sync",
            "--config",
            path.as_str(),
            "--timeout-secs",
            "20",
        ]);
        let config = UpdaterConfig::from_cli(&cli).unwrap();
        assert_eq!(config.games_file, PathBuf::from("from_file.js"));
        assert_eq!(config.array_name, "upcoming");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert!(config.dry_run);
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        let parsed: Result<ConfigFile, _> = serde_yaml::from_str("games_fil: typo.js");
        assert!(parsed.is_err());
    }
}
