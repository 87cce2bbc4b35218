//! Refresh release dates for every named game in the games file.
//!
//! One run is a single read-modify-write of the file:
//!
//! 1. Read the file and index the configured array's blocks
//! 2. For each named block, in order and one at a time, fetch the raw
//!    release text and classify it
//! 3. Patch the two release fields of each named block
//! 4. Write the file back (unless dry-run) and optionally a JSON snapshot
//!
//! A failed fetch never aborts the run; that game simply gets `TBA`.

use crate::classifier::classify;
use crate::config::UpdaterConfig;
use crate::models::{DateRecord, GameEntry, ReleaseType};
use crate::outputs::json;
use crate::scrapers::ReleaseDateSource;
use crate::store::{self, GamesDocument};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{info, instrument, warn};

/// Counts from one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Blocks found in the array.
    pub total_blocks: usize,
    /// Named blocks that received a fresh record.
    pub updated: usize,
    /// Blocks without a `name`, passed through untouched.
    pub skipped_unnamed: usize,
    /// Fetches that errored (each degraded to `TBA`).
    pub fetch_failures: usize,
    /// Fresh records that ended up as `TBA`, for any reason.
    pub tba: usize,
    /// Fresh records per release type.
    pub by_type: BTreeMap<ReleaseType, usize>,
    /// Whether the games file was rewritten.
    pub written: bool,
}

/// Outcome of looking up one title.
#[derive(Debug)]
struct Lookup {
    record: DateRecord,
    failed: bool,
}

/// Fetch the raw text for `title` and classify it.
///
/// A fetch error or a page without a result counts as empty input.
async fn lookup<S: ReleaseDateSource>(source: &S, title: &str) -> Lookup {
    match source.fetch_release_text(title).await {
        Ok(raw) => Lookup {
            record: classify(raw.as_deref().unwrap_or_default()),
            failed: false,
        },
        Err(e) => {
            warn!(%title, error = %e, "Release date fetch failed; treating as empty");
            Lookup {
                record: classify(""),
                failed: true,
            }
        }
    }
}

/// Run one refresh of `config.games_file` against `source`.
///
/// Titles are looked up one at a time in file order. A failed lookup is
/// logged, recorded as `TBA`, and the run moves on to the next title.
///
/// # Arguments
///
/// * `config` - Resolved settings (games file, array name, dry-run, snapshot path)
/// * `source` - Where raw release-date text comes from
///
/// # Returns
///
/// An [`UpdateSummary`] with per-run counts. A missing array is logged and
/// yields an empty summary without touching the file.
///
/// # Errors
///
/// Fails if the games file cannot be read or written, or the snapshot
/// cannot be written.
#[instrument(level = "info", skip_all, fields(games_file = %config.games_file.display(), array = %config.array_name))]
pub async fn run<S: ReleaseDateSource>(
    config: &UpdaterConfig,
    source: &S,
) -> Result<UpdateSummary, Box<dyn Error>> {
    let content = store::read_games_file(&config.games_file).await?;
    let document = match GamesDocument::parse(content, &config.array_name) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "Nothing to update");
            return Ok(UpdateSummary::default());
        }
    };

    let mut summary = UpdateSummary {
        total_blocks: document.blocks().len(),
        ..Default::default()
    };

    for name in document
        .blocks()
        .iter()
        .filter_map(|b| b.entry.as_ref().map(|e| e.name.as_str()))
        .duplicates()
    {
        warn!(%name, "Duplicate game name; each entry is looked up separately");
    }

    let lookups: Vec<Option<Lookup>> = stream::iter(document.blocks())
        .then(|block| async move {
            match &block.entry {
                Some(entry) => Some(lookup(source, &entry.name).await),
                None => None,
            }
        })
        .collect()
        .await;

    let mut entries: Vec<GameEntry> = Vec::new();
    let mut records: Vec<Option<DateRecord>> = Vec::with_capacity(lookups.len());
    for (block, found) in document.blocks().iter().zip(lookups) {
        match (&block.entry, found) {
            (Some(entry), Some(found)) => {
                let mut entry = entry.clone();
                entry.apply(&found.record);
                info!(
                    name = %entry.name,
                    release_info = %found.record.text(),
                    release_type = %found.record.release_type(),
                    "Classified release date"
                );

                summary.updated += 1;
                summary.fetch_failures += usize::from(found.failed);
                summary.tba += usize::from(found.record.is_tba());
                *summary.by_type.entry(found.record.release_type()).or_default() += 1;
                entries.push(entry);
                records.push(Some(found.record));
            }
            _ => {
                summary.skipped_unnamed += 1;
                records.push(None);
            }
        }
    }

    if config.dry_run {
        info!("Dry run; games file left untouched");
    } else {
        store::write_atomically(&config.games_file, &document.render(&records))?;
        summary.written = true;
    }

    if let Some(path) = &config.json_output {
        json::write_snapshot(&entries, path).await?;
    }

    info!(
        total = summary.total_blocks,
        updated = summary.updated,
        skipped = summary.skipped_unnamed,
        failures = summary.fetch_failures,
        tba = summary.tba,
        "Update complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    const GAMES_JS: &str = r#"const games = [];

const comingSoonGames = [
    { id: 1, name: "Hades II" },
    { id: 2, title: "No Name Here" },
    { id: 3, name: "Offline Game" },
    { id: 4, name: "Silksong", release_info: "TBA", release_type: "window" }
];
"#;

    /// Serves canned answers and records the order of requests.
    struct FakeSearch {
        answers: HashMap<&'static str, Option<&'static str>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSearch {
        fn new() -> Self {
            let answers = HashMap::from([
                ("Hades II", Some("25 Sep, 2025")),
                ("Silksong", Some("Q1 2026")),
            ]);
            Self {
                answers,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReleaseDateSource for FakeSearch {
        async fn fetch_release_text(&self, title: &str) -> Result<Option<String>, Box<dyn Error>> {
            self.calls.borrow_mut().push(title.to_string());
            match self.answers.get(title) {
                Some(answer) => Ok(answer.map(str::to_string)),
                None => Err("connection timed out".into()),
            }
        }
    }

    fn config_for(path: PathBuf) -> UpdaterConfig {
        UpdaterConfig {
            games_file: path,
            array_name: "comingSoonGames".to_string(),
            search_url: "http://localhost/search/".to_string(),
            timeout: Duration::from_secs(1),
            json_output: None,
            dry_run: false,
        }
    }

    fn write_games(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("games.js");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_updates_named_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_games(&dir, GAMES_JS);
        let source = FakeSearch::new();

        let summary = run(&config_for(path.clone()), &source).await.unwrap();

        assert_eq!(summary.total_blocks, 4);
        assert_eq!(summary.updated, 3);
        assert_eq!(summary.skipped_unnamed, 1);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.tba, 1);
        assert_eq!(summary.by_type.get(&ReleaseType::Date), Some(&1));
        assert_eq!(summary.by_type.get(&ReleaseType::Window), Some(&2));
        assert!(summary.written);
        assert_eq!(
            *source.calls.borrow(),
            vec!["Hades II", "Offline Game", "Silksong"]
        );

        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains(
            r#"{ id: 1, name: "Hades II", release_info: "25/09/2025", release_type: "date" },"#
        ));
        assert!(out.contains(r#"{ id: 2, title: "No Name Here" },"#));
        // The failed lookup still gets TBA, and the title after it is still patched.
        assert!(out.contains(
            r#"{ id: 3, name: "Offline Game", release_info: "TBA", release_type: "window" },"#
        ));
        assert!(out.contains(
            r#"{ id: 4, name: "Silksong", release_info: "WINDOW: Q1 2026", release_type: "window" }"#
        ));
        assert!(out.starts_with("const games = [];\n"));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_file_and_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_games(&dir, GAMES_JS);
        let snapshot_path = dir.path().join("out/coming_soon.json");
        let mut config = config_for(path.clone());
        config.dry_run = true;
        config.json_output = Some(snapshot_path.clone());

        let summary = run(&config, &FakeSearch::new()).await.unwrap();

        assert!(!summary.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), GAMES_JS);

        let snapshot: json::Snapshot =
            serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
        let names: Vec<&str> = snapshot.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Hades II", "Offline Game", "Silksong"]);
        assert_eq!(snapshot.games[1].release_info.as_deref(), Some("TBA"));
        assert_eq!(snapshot.games[2].release_info.as_deref(), Some("WINDOW: Q1 2026"));
    }

    #[tokio::test]
    async fn test_missing_array_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_games(&dir, "const games = [];\n");

        let summary = run(&config_for(path.clone()), &FakeSearch::new()).await.unwrap();

        assert_eq!(summary, UpdateSummary::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "const games = [];\n");
    }

    #[tokio::test]
    async fn test_missing_games_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("missing.js"));
        assert!(run(&config, &FakeSearch::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_without_result_is_tba() {
        let mut source = FakeSearch::new();
        source.answers.insert("Delisted", None);

        let found = lookup(&source, "Delisted").await;
        assert!(found.record.is_tba());
        assert!(!found.failed);

        let failed = lookup(&source, "Unknown").await;
        assert!(failed.record.is_tba());
        assert!(failed.failed);
    }
}
